use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

use leadstore::engine::{docstore, DocStore, Persistence};
use leadstore::model::{AdvertisementDraft, Database, EnquiryDraft, EnquiryPatch, Role, Session};
use leadstore::sdk::{queries, Client};
use leadstore::{AdvertisementOps, EnquiryOps, Error, LeadStore, UserOps};

fn enquiry_draft(name: &str, mobile: &str) -> EnquiryDraft {
    EnquiryDraft {
        full_name: name.to_string(),
        mobile: mobile.to_string(),
        email: format!("{}@example.com", mobile),
        state: "Maharashtra".to_string(),
        status: "New".to_string(),
        ..Default::default()
    }
}

async fn spawn_server() -> (String, Arc<DocStore>) {
    let store = Arc::new(DocStore::new(Database::default(), None).unwrap());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let store_clone = store.clone();
    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            let s: Arc<dyn LeadStore> = store_clone.clone();
            tokio::spawn(async move {
                let _ = leadstore::server::router::handle_connection(socket, s).await;
            });
        }
    });

    (addr.to_string(), store)
}

#[tokio::test]
async fn test_client_roundtrip_over_tcp() {
    let (addr, _store) = spawn_server().await;
    let client = Client::connect(&addr).await.unwrap();

    let added = client
        .add_enquiry(enquiry_draft("Asha Patil", "9876543210"))
        .await
        .unwrap();
    assert!(added.id.starts_with("ENQ-"));

    let all = client.list_enquiries().await.unwrap();
    assert_eq!(all, vec![added.clone()]);

    client
        .update_enquiry(
            &added.id,
            EnquiryPatch {
                status: Some("Contacted".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let got = client.list_enquiries().await.unwrap().remove(0);
    assert_eq!(got.status, "Contacted");
    assert_eq!(got.full_name, "Asha Patil");
}

#[tokio::test]
async fn test_role_gate_over_tcp() {
    let (addr, _store) = spawn_server().await;
    let client = Client::connect(&addr).await.unwrap();

    let added = client
        .add_enquiry(enquiry_draft("Asha Patil", "9876543210"))
        .await
        .unwrap();

    let operator = Session {
        username: "ops".to_string(),
        role: Role::User,
    };
    let res = client.delete_enquiry(&operator, &added.id).await;
    assert!(matches!(res, Err(Error::Forbidden(_))));
    assert_eq!(client.list_enquiries().await.unwrap().len(), 1);

    // The seeded admin can log in over the wire and delete.
    let session = client
        .login(docstore::DEFAULT_ADMIN_USERNAME, docstore::DEFAULT_ADMIN_PASSWORD)
        .await
        .unwrap();
    assert!(session.is_admin());
    client.delete_enquiry(&session, &added.id).await.unwrap();
    assert!(client.list_enquiries().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_bad_login_over_tcp() {
    let (addr, _store) = spawn_server().await;
    let client = Client::connect(&addr).await.unwrap();

    let res = client.login(docstore::DEFAULT_ADMIN_USERNAME, "wrong").await;
    assert!(matches!(res, Err(Error::InvalidCredentials)));
}

#[tokio::test]
async fn test_import_pipeline_through_client() {
    let (addr, _store) = spawn_server().await;
    let client = Client::connect(&addr).await.unwrap();

    let rows = vec![
        AdvertisementDraft {
            name: "Lead One".to_string(),
            phone_no: "9811111111".to_string(),
            email: "one@example.com".to_string(),
            ..Default::default()
        },
        AdvertisementDraft {
            name: "Lead Two".to_string(),
            phone_no: "123".to_string(),
            email: "two@example.com".to_string(),
            ..Default::default()
        },
    ];
    let report = queries::import_advertisements(&client, rows, Some("admin"))
        .await
        .unwrap();
    assert_eq!(report.imported, 1);
    assert_eq!(report.failed, 1);

    let stored = client.list_advertisements().await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].imported_by.as_deref(), Some("admin"));
}

#[tokio::test]
async fn test_raw_protocol() {
    let (addr, _store) = spawn_server().await;

    let stream = TcpStream::connect(&addr).await.unwrap();
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut response = String::new();

    writer.write_all(b"PING\n").await.unwrap();
    reader.read_line(&mut response).await.unwrap();
    assert_eq!(response.trim(), "PONG");

    writer.write_all(b"ENQ.LIST\n").await.unwrap();
    response.clear();
    reader.read_line(&mut response).await.unwrap();
    assert_eq!(response.trim(), "OK []");

    writer.write_all(b"ENQ.ADD {not json\n").await.unwrap();
    response.clear();
    reader.read_line(&mut response).await.unwrap();
    assert_eq!(response.trim(), "ERR invalid json payload");

    writer.write_all(b"DROP.TABLES\n").await.unwrap();
    response.clear();
    reader.read_line(&mut response).await.unwrap();
    assert_eq!(response.trim(), "ERR unknown command");
}

#[tokio::test]
async fn test_document_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let persistence = Arc::new(Persistence::new(dir.path()).unwrap());

    let added = {
        let store = DocStore::open(persistence.clone()).unwrap();
        let added = store
            .add_enquiry(enquiry_draft("Asha Patil", "9876543210"))
            .await
            .unwrap();
        store.wait().await;
        added
    };

    let reopened = DocStore::open(persistence).unwrap();
    let all = reopened.list_enquiries().await.unwrap();
    assert_eq!(all, vec![added]);
    // The seeded admin from the first open is still the only user.
    assert_eq!(reopened.list_users().await.unwrap().len(), 1);
}
