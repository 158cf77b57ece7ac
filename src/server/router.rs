use std::sync::Arc;

use log::{error, info};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Semaphore;

use crate::model::{
    AdvertisementDraft, AdvertisementPatch, EnquiryDraft, EnquiryPatch, LoginRequest, Session,
    UserDraft, UserPatch,
};
use crate::{AdvertisementOps, EnquiryOps, LeadStore, Result, UserOps};

/// The boundary between callers and the privileged host.
///
/// Exactly the named operations below cross this boundary, one request per
/// line. There is no generic "execute" path and no file-system parameter a
/// client could smuggle in; an unknown command is answered with an error
/// and nothing else happens.
pub struct Router {
    store: Arc<dyn LeadStore>,
    semaphore: Arc<Semaphore>,
}

impl Router {
    pub fn new(store: Arc<dyn LeadStore>) -> Self {
        Self {
            store,
            semaphore: Arc::new(Semaphore::new(100)),
        }
    }

    pub async fn listen(&self, port: &str) -> Result<()> {
        let listener = TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
        info!("Leadstore listening on port {}", port);

        loop {
            let (socket, _) = listener.accept().await?;
            let store = self.store.clone();
            let sem = self.semaphore.clone();

            tokio::spawn(async move {
                let _permit = match sem.try_acquire() {
                    Ok(p) => p,
                    Err(_) => {
                        error!("Server busy: too many concurrent connections. Rejecting...");
                        let mut socket = socket;
                        let _ = socket.shutdown().await;
                        return;
                    }
                };

                if let Err(e) = handle_connection(socket, store).await {
                    error!("Connection error: {}", e);
                }
            });
        }
    }
}

pub async fn handle_connection(mut socket: TcpStream, store: Arc<dyn LeadStore>) -> Result<()> {
    let (reader, mut writer) = socket.split();
    let mut reader = BufReader::new(reader);
    let mut line = String::new();

    loop {
        line.clear();
        let bytes_read = reader.read_line(&mut line).await?;
        if bytes_read == 0 {
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        // Command word first; everything after the first space is the
        // operand region, split further per command so JSON payloads keep
        // their exact bytes.
        let (command, rest) = match trimmed.split_once(' ') {
            Some((cmd, rest)) => (cmd.to_uppercase(), rest.trim()),
            None => (trimmed.to_uppercase(), ""),
        };

        let response = match command.as_str() {
            "ENQ.LIST" => reply(store.list_enquiries().await),
            "ENQ.ADD" => match parse_json::<EnquiryDraft>(rest) {
                Ok(draft) => reply(store.add_enquiry(draft).await),
                Err(msg) => msg,
            },
            "ENQ.UPDATE" => match split_id_payload(rest) {
                Ok((id, payload)) => match parse_json::<EnquiryPatch>(payload) {
                    Ok(patch) => reply(store.update_enquiry(id, patch).await),
                    Err(msg) => msg,
                },
                Err(msg) => msg,
            },
            "ENQ.DEL" => match split_id_payload(rest) {
                Ok((id, payload)) => match parse_json::<Session>(payload) {
                    Ok(session) => reply(store.delete_enquiry(&session, id).await),
                    Err(msg) => msg,
                },
                Err(msg) => msg,
            },
            "USR.LIST" => reply(store.list_users().await),
            "USR.ADD" => match parse_json::<UserDraft>(rest) {
                Ok(draft) => reply(store.add_user(draft).await),
                Err(msg) => msg,
            },
            "USR.UPDATE" => match split_id_payload(rest) {
                Ok((id, payload)) => match parse_json::<UserPatch>(payload) {
                    Ok(patch) => reply(store.update_user(id, patch).await),
                    Err(msg) => msg,
                },
                Err(msg) => msg,
            },
            "USR.DEL" => match split_id_payload(rest) {
                Ok((id, payload)) => match parse_json::<Session>(payload) {
                    Ok(session) => reply(store.delete_user(&session, id).await),
                    Err(msg) => msg,
                },
                Err(msg) => msg,
            },
            "USR.LOGIN" => match parse_json::<LoginRequest>(rest) {
                Ok(req) => reply(store.login(&req.username, &req.password).await),
                Err(msg) => msg,
            },
            "ADV.LIST" => reply(store.list_advertisements().await),
            "ADV.ADD" => match parse_json::<AdvertisementDraft>(rest) {
                Ok(draft) => reply(store.add_advertisement(draft).await),
                Err(msg) => msg,
            },
            "ADV.BULKADD" => match parse_json::<Vec<AdvertisementDraft>>(rest) {
                Ok(drafts) => reply(store.bulk_add_advertisements(drafts).await),
                Err(msg) => msg,
            },
            "ADV.UPDATE" => match split_id_payload(rest) {
                Ok((id, payload)) => match parse_json::<AdvertisementPatch>(payload) {
                    Ok(patch) => reply(store.update_advertisement(id, patch).await),
                    Err(msg) => msg,
                },
                Err(msg) => msg,
            },
            "ADV.DEL" => match split_id_payload(rest) {
                Ok((id, payload)) => match parse_json::<Session>(payload) {
                    Ok(session) => reply(store.delete_advertisement(&session, id).await),
                    Err(msg) => msg,
                },
                Err(msg) => msg,
            },
            "PING" => "PONG".to_string(),
            "QUIT" => break,
            _ => "ERR unknown command".to_string(),
        };

        writer.write_all(format!("{}\n", response).as_bytes()).await?;
    }
    Ok(())
}

/// Splits `<id> <json>` operands; the payload keeps its exact bytes.
fn split_id_payload(rest: &str) -> std::result::Result<(&str, &str), String> {
    match rest.split_once(' ') {
        Some((id, payload)) if !payload.trim().is_empty() => Ok((id, payload.trim())),
        _ => Err("ERR missing arguments".to_string()),
    }
}

fn parse_json<T: serde::de::DeserializeOwned>(payload: &str) -> std::result::Result<T, String> {
    if payload.is_empty() {
        return Err("ERR missing arguments".to_string());
    }
    serde_json::from_str(payload).map_err(|_| "ERR invalid json payload".to_string())
}

/// Folds an operation result into the response line. Unit results answer a
/// bare `OK`; anything serializable rides along after it.
fn reply<T: serde::Serialize>(result: Result<T>) -> String {
    match result {
        Ok(value) => {
            let json = match serde_json::to_string(&value) {
                Ok(j) => j,
                Err(e) => return format!("ERR {}", e.to_string().to_lowercase()),
            };
            if json == "null" {
                "OK".to_string()
            } else {
                format!("OK {}", json)
            }
        }
        Err(e) => format!("ERR {}", e.to_string().to_lowercase()),
    }
}
