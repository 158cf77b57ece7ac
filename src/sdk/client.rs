use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::Mutex;

use crate::model::{
    AdvertisementDraft, AdvertisementEnquiry, AdvertisementPatch, Enquiry, EnquiryDraft,
    EnquiryPatch, LoginRequest, Session, User, UserDraft, UserPatch,
};
use crate::{AdvertisementOps, EnquiryOps, Error, Result, UserOps};

/// Remote-mode client: speaks the daemon's line protocol and implements
/// the same operation traits as the embedded engine.
///
/// The connection is re-established lazily before a send, never after a
/// failed one: a mutation is sent at most once, so a flaky link can lose
/// an operation but never replay it.
pub struct Client {
    addr: String,
    inner: Mutex<Option<ClientInner>>,
}

struct ClientInner {
    reader: BufReader<tokio::net::tcp::OwnedReadHalf>,
    writer: tokio::net::tcp::OwnedWriteHalf,
}

impl Client {
    pub async fn connect(addr: &str) -> Result<Self> {
        let inner = Client::connect_inner(addr).await?;
        Ok(Self {
            addr: addr.to_string(),
            inner: Mutex::new(Some(inner)),
        })
    }

    async fn connect_inner(addr: &str) -> Result<ClientInner> {
        let stream = TcpStream::connect(addr).await?;
        let (reader, writer) = stream.into_split();
        Ok(ClientInner {
            reader: BufReader::new(reader),
            writer,
        })
    }

    async fn send_and_receive(&self, cmd: String) -> Result<String> {
        let mut inner_guard = self.inner.lock().await;

        if inner_guard.is_none() {
            let mut last_err = None;
            for i in 0..3u64 {
                match Client::connect_inner(&self.addr).await {
                    Ok(inner) => {
                        *inner_guard = Some(inner);
                        last_err = None;
                        break;
                    }
                    Err(e) => {
                        last_err = Some(e);
                        tokio::time::sleep(std::time::Duration::from_millis((i + 1) * 200)).await;
                    }
                }
            }
            if let Some(e) = last_err {
                return Err(e);
            }
        }

        let inner = inner_guard.as_mut().unwrap();
        if let Err(e) = inner.writer.write_all(format!("{}\n", cmd).as_bytes()).await {
            *inner_guard = None;
            return Err(Error::Io(e));
        }

        let mut resp = String::new();
        match inner.reader.read_line(&mut resp).await {
            Ok(0) => {
                *inner_guard = None;
                Err(Error::Internal("connection closed by host".to_string()))
            }
            Ok(_) => {
                let resp = resp.trim();
                if let Some(msg) = resp.strip_prefix("ERR ") {
                    return Err(Error::from_wire(msg));
                }
                Ok(resp.to_string())
            }
            Err(e) => {
                *inner_guard = None;
                Err(Error::Io(e))
            }
        }
    }
}

fn parse_payload<T: DeserializeOwned>(resp: &str) -> Result<T> {
    let json_data = resp
        .strip_prefix("OK ")
        .ok_or_else(|| Error::Internal("invalid response".to_string()))?;
    Ok(serde_json::from_str(json_data)?)
}

#[async_trait]
impl EnquiryOps for Client {
    async fn list_enquiries(&self) -> Result<Vec<Enquiry>> {
        let resp = self.send_and_receive("ENQ.LIST".to_string()).await?;
        parse_payload(&resp)
    }

    async fn add_enquiry(&self, draft: EnquiryDraft) -> Result<Enquiry> {
        let resp = self
            .send_and_receive(format!("ENQ.ADD {}", serde_json::to_string(&draft)?))
            .await?;
        parse_payload(&resp)
    }

    async fn update_enquiry(&self, id: &str, patch: EnquiryPatch) -> Result<()> {
        self.send_and_receive(format!(
            "ENQ.UPDATE {} {}",
            id,
            serde_json::to_string(&patch)?
        ))
        .await?;
        Ok(())
    }

    async fn delete_enquiry(&self, session: &Session, id: &str) -> Result<()> {
        self.send_and_receive(format!(
            "ENQ.DEL {} {}",
            id,
            serde_json::to_string(session)?
        ))
        .await?;
        Ok(())
    }
}

#[async_trait]
impl UserOps for Client {
    async fn list_users(&self) -> Result<Vec<User>> {
        let resp = self.send_and_receive("USR.LIST".to_string()).await?;
        parse_payload(&resp)
    }

    async fn add_user(&self, draft: UserDraft) -> Result<User> {
        let resp = self
            .send_and_receive(format!("USR.ADD {}", serde_json::to_string(&draft)?))
            .await?;
        parse_payload(&resp)
    }

    async fn update_user(&self, id: &str, patch: UserPatch) -> Result<()> {
        self.send_and_receive(format!(
            "USR.UPDATE {} {}",
            id,
            serde_json::to_string(&patch)?
        ))
        .await?;
        Ok(())
    }

    async fn delete_user(&self, session: &Session, id: &str) -> Result<()> {
        self.send_and_receive(format!(
            "USR.DEL {} {}",
            id,
            serde_json::to_string(session)?
        ))
        .await?;
        Ok(())
    }

    async fn login(&self, username: &str, password: &str) -> Result<Session> {
        let req = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let resp = self
            .send_and_receive(format!("USR.LOGIN {}", serde_json::to_string(&req)?))
            .await?;
        parse_payload(&resp)
    }
}

#[async_trait]
impl AdvertisementOps for Client {
    async fn list_advertisements(&self) -> Result<Vec<AdvertisementEnquiry>> {
        let resp = self.send_and_receive("ADV.LIST".to_string()).await?;
        parse_payload(&resp)
    }

    async fn add_advertisement(&self, draft: AdvertisementDraft) -> Result<AdvertisementEnquiry> {
        let resp = self
            .send_and_receive(format!("ADV.ADD {}", serde_json::to_string(&draft)?))
            .await?;
        parse_payload(&resp)
    }

    async fn bulk_add_advertisements(
        &self,
        drafts: Vec<AdvertisementDraft>,
    ) -> Result<Vec<AdvertisementEnquiry>> {
        let resp = self
            .send_and_receive(format!("ADV.BULKADD {}", serde_json::to_string(&drafts)?))
            .await?;
        parse_payload(&resp)
    }

    async fn update_advertisement(&self, id: &str, patch: AdvertisementPatch) -> Result<()> {
        self.send_and_receive(format!(
            "ADV.UPDATE {} {}",
            id,
            serde_json::to_string(&patch)?
        ))
        .await?;
        Ok(())
    }

    async fn delete_advertisement(&self, session: &Session, id: &str) -> Result<()> {
        self.send_and_receive(format!(
            "ADV.DEL {} {}",
            id,
            serde_json::to_string(session)?
        ))
        .await?;
        Ok(())
    }
}
