use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::Utc;

use crate::engine::{credentials, Persistence};
use crate::model::{
    AdvertisementDraft, AdvertisementEnquiry, AdvertisementPatch, Database, Enquiry, EnquiryDraft,
    EnquiryPatch, Role, Session, User, UserDraft, UserPatch,
};
use crate::{AdvertisementOps, EnquiryOps, Error, Result, UserOps};

/// Username of the administrator seeded into an empty store.
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
/// Initial password of the seeded administrator; operators are expected to
/// change it after first login.
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

/// The privileged host: owns the document in memory and is the only thing
/// that ever touches the backing file.
///
/// Every operation is a read-modify-write against the in-memory state;
/// mutations snapshot the whole document and persist it on a blocking task.
/// The role gate for deletes lives here, not in any caller.
pub struct DocStore {
    data: RwLock<Database>,
    persistence: Option<Arc<Persistence>>,
    pending_tasks: Arc<AtomicUsize>,
}

impl DocStore {
    /// Wraps an already-loaded document. An empty user collection is seeded
    /// with the default administrator and written back immediately.
    pub fn new(initial: Database, persistence: Option<Arc<Persistence>>) -> Result<Self> {
        let store = Self {
            data: RwLock::new(initial),
            persistence,
            pending_tasks: Arc::new(AtomicUsize::new(0)),
        };
        store.seed_admin()?;
        Ok(store)
    }

    /// Loads the document from disk and wraps it.
    pub fn open(persistence: Arc<Persistence>) -> Result<Self> {
        let initial = persistence.load()?;
        Self::new(initial, Some(persistence))
    }

    /// Blocks until every queued disk write has finished. Called on
    /// shutdown so the last mutation is not lost.
    pub async fn wait(&self) {
        while self.pending_tasks.load(Ordering::SeqCst) > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
    }

    fn seed_admin(&self) -> Result<()> {
        let mut data = self.data.write().unwrap();
        if !data.users.is_empty() {
            return Ok(());
        }

        let password_hash = credentials::hash(DEFAULT_ADMIN_PASSWORD)?;
        let admin = User::from_draft(
            UserDraft {
                username: DEFAULT_ADMIN_USERNAME.to_string(),
                password: String::new(),
                role: Role::Admin,
                full_name: "Administrator".to_string(),
                email: None,
                created_by: None,
            },
            password_hash,
        );
        log::info!("Seeding default administrator account");
        data.users.push(admin);

        if let Some(p) = &self.persistence {
            p.save(&data)?;
        }
        Ok(())
    }

    fn copy_database(&self) -> Database {
        self.data.read().unwrap().clone()
    }

    async fn persist(&self) {
        if let Some(p) = &self.persistence {
            let snapshot = self.copy_database();
            let p = p.clone();
            let pending = self.pending_tasks.clone();
            pending.fetch_add(1, Ordering::SeqCst);
            tokio::task::spawn_blocking(move || {
                if let Err(e) = p.save(&snapshot) {
                    log::error!("Failed to persist database: {}", e);
                }
                pending.fetch_sub(1, Ordering::SeqCst);
            });
        }
    }
}

/// The single authorization gate: every delete passes through here before
/// the collection is touched.
fn require_admin(session: &Session) -> Result<()> {
    if session.is_admin() {
        Ok(())
    } else {
        Err(Error::Forbidden("admin role required".to_string()))
    }
}

#[async_trait]
impl EnquiryOps for DocStore {
    async fn list_enquiries(&self) -> Result<Vec<Enquiry>> {
        Ok(self.data.read().unwrap().enquiries.clone())
    }

    async fn add_enquiry(&self, draft: EnquiryDraft) -> Result<Enquiry> {
        let enquiry = Enquiry::from_draft(draft);
        {
            let mut data = self.data.write().unwrap();
            data.enquiries.push(enquiry.clone());
        }
        self.persist().await;
        Ok(enquiry)
    }

    async fn update_enquiry(&self, id: &str, patch: EnquiryPatch) -> Result<()> {
        {
            let mut data = self.data.write().unwrap();
            let enquiry = data
                .enquiries
                .iter_mut()
                .find(|e| e.id == id)
                .ok_or(Error::NotFound)?;
            patch.apply(enquiry);
            enquiry.updated_at = Utc::now();
        }
        self.persist().await;
        Ok(())
    }

    async fn delete_enquiry(&self, session: &Session, id: &str) -> Result<()> {
        require_admin(session)?;
        {
            let mut data = self.data.write().unwrap();
            data.enquiries.retain(|e| e.id != id);
        }
        self.persist().await;
        Ok(())
    }
}

#[async_trait]
impl UserOps for DocStore {
    async fn list_users(&self) -> Result<Vec<User>> {
        Ok(self.data.read().unwrap().users.clone())
    }

    async fn add_user(&self, draft: UserDraft) -> Result<User> {
        let password_hash = credentials::hash(&draft.password)?;
        let user = User::from_draft(draft, password_hash);
        {
            let mut data = self.data.write().unwrap();
            data.users.push(user.clone());
        }
        self.persist().await;
        Ok(user)
    }

    async fn update_user(&self, id: &str, patch: UserPatch) -> Result<()> {
        // Hash outside the lock; a blank password keeps the stored hash.
        let new_hash = match patch.password.as_deref() {
            Some(p) if !p.is_empty() => Some(credentials::hash(p)?),
            _ => None,
        };
        {
            let mut data = self.data.write().unwrap();
            let user = data
                .users
                .iter_mut()
                .find(|u| u.id == id)
                .ok_or(Error::NotFound)?;
            patch.apply(user);
            if let Some(hash) = new_hash {
                user.password_hash = hash;
            }
        }
        self.persist().await;
        Ok(())
    }

    async fn delete_user(&self, session: &Session, id: &str) -> Result<()> {
        require_admin(session)?;
        {
            let mut data = self.data.write().unwrap();
            if let Some(user) = data.users.iter_mut().find(|u| u.id == id) {
                if user.username == session.username {
                    return Err(Error::Forbidden(
                        "cannot deactivate your own account".to_string(),
                    ));
                }
                user.is_active = false;
            }
        }
        self.persist().await;
        Ok(())
    }

    async fn login(&self, username: &str, password: &str) -> Result<Session> {
        let (stored_hash, session) = {
            let data = self.data.read().unwrap();
            let user = data
                .users
                .iter()
                .find(|u| u.is_active && u.username == username)
                .ok_or(Error::InvalidCredentials)?;
            (
                user.password_hash.clone(),
                Session {
                    username: user.username.clone(),
                    role: user.role,
                },
            )
        };
        if credentials::verify(password, &stored_hash) {
            Ok(session)
        } else {
            Err(Error::InvalidCredentials)
        }
    }
}

#[async_trait]
impl AdvertisementOps for DocStore {
    async fn list_advertisements(&self) -> Result<Vec<AdvertisementEnquiry>> {
        Ok(self.data.read().unwrap().advertisements.clone())
    }

    async fn add_advertisement(&self, draft: AdvertisementDraft) -> Result<AdvertisementEnquiry> {
        let record = AdvertisementEnquiry::from_draft(draft);
        {
            let mut data = self.data.write().unwrap();
            data.advertisements.push(record.clone());
        }
        self.persist().await;
        Ok(record)
    }

    async fn bulk_add_advertisements(
        &self,
        drafts: Vec<AdvertisementDraft>,
    ) -> Result<Vec<AdvertisementEnquiry>> {
        let records: Vec<AdvertisementEnquiry> = drafts
            .into_iter()
            .map(AdvertisementEnquiry::from_draft)
            .collect();
        {
            // One write for the whole batch; the import pipeline relies on
            // this being a single I/O round trip.
            let mut data = self.data.write().unwrap();
            data.advertisements.extend(records.iter().cloned());
        }
        self.persist().await;
        Ok(records)
    }

    async fn update_advertisement(&self, id: &str, patch: AdvertisementPatch) -> Result<()> {
        {
            let mut data = self.data.write().unwrap();
            let record = data
                .advertisements
                .iter_mut()
                .find(|a| a.id == id)
                .ok_or(Error::NotFound)?;
            patch.apply(record);
        }
        self.persist().await;
        Ok(())
    }

    async fn delete_advertisement(&self, session: &Session, id: &str) -> Result<()> {
        require_admin(session)?;
        {
            let mut data = self.data.write().unwrap();
            data.advertisements.retain(|a| a.id != id);
        }
        self.persist().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> DocStore {
        DocStore::new(Database::default(), None).unwrap()
    }

    fn admin_session() -> Session {
        Session {
            username: "boss".to_string(),
            role: Role::Admin,
        }
    }

    fn enquiry_draft() -> EnquiryDraft {
        EnquiryDraft {
            full_name: "Asha Patil".to_string(),
            mobile: "9876543210".to_string(),
            email: "asha@example.com".to_string(),
            state: "Maharashtra".to_string(),
            status: "New".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_add_then_list_roundtrip() {
        let store = store();
        let added = store.add_enquiry(enquiry_draft()).await.unwrap();

        let all = store.list_enquiries().await.unwrap();
        assert_eq!(all, vec![added]);
    }

    #[tokio::test]
    async fn test_update_merges_and_bumps_updated_at() {
        let store = store();
        let added = store.add_enquiry(enquiry_draft()).await.unwrap();

        let patch = EnquiryPatch {
            status: Some("Contacted".to_string()),
            ..Default::default()
        };
        store.update_enquiry(&added.id, patch).await.unwrap();

        let got = store.list_enquiries().await.unwrap().remove(0);
        assert_eq!(got.status, "Contacted");
        assert_eq!(got.full_name, added.full_name);
        assert_eq!(got.mobile, added.mobile);
        assert_eq!(got.created_at, added.created_at);
        assert!(got.updated_at >= added.updated_at);
    }

    #[tokio::test]
    async fn test_update_missing_id_is_not_found() {
        let store = store();
        let res = store
            .update_enquiry("ENQ-0-deadbeef", EnquiryPatch::default())
            .await;
        assert!(matches!(res, Err(Error::NotFound)));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = store();
        store.add_enquiry(enquiry_draft()).await.unwrap();

        store
            .delete_enquiry(&admin_session(), "ENQ-0-deadbeef")
            .await
            .unwrap();
        assert_eq!(store.list_enquiries().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_requires_admin() {
        let store = store();
        let added = store.add_enquiry(enquiry_draft()).await.unwrap();

        let operator = Session {
            username: "ops".to_string(),
            role: Role::User,
        };
        let res = store.delete_enquiry(&operator, &added.id).await;
        assert!(matches!(res, Err(Error::Forbidden(_))));
        // The collection must be untouched after a rejected delete.
        assert_eq!(store.list_enquiries().await.unwrap().len(), 1);

        store.delete_enquiry(&admin_session(), &added.id).await.unwrap();
        assert!(store.list_enquiries().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_store_seeds_default_admin() {
        let store = store();
        let users = store.list_users().await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].username, DEFAULT_ADMIN_USERNAME);
        assert_eq!(users[0].role, Role::Admin);

        // A second read sees the same record, not a fresh seed.
        let again = store.list_users().await.unwrap();
        assert_eq!(again[0].id, users[0].id);
    }

    #[tokio::test]
    async fn test_seed_skipped_when_users_exist() {
        let store = store();
        let seeded = store.list_users().await.unwrap();
        let reopened = DocStore::new(
            Database {
                users: seeded.clone(),
                ..Default::default()
            },
            None,
        )
        .unwrap();
        assert_eq!(reopened.list_users().await.unwrap(), seeded);
    }

    #[tokio::test]
    async fn test_login_and_bad_credentials() {
        let store = store();
        let session = store
            .login(DEFAULT_ADMIN_USERNAME, DEFAULT_ADMIN_PASSWORD)
            .await
            .unwrap();
        assert!(session.is_admin());

        let res = store.login(DEFAULT_ADMIN_USERNAME, "wrong").await;
        assert!(matches!(res, Err(Error::InvalidCredentials)));
        let res = store.login("nobody", DEFAULT_ADMIN_PASSWORD).await;
        assert!(matches!(res, Err(Error::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_user_delete_is_soft_and_blocks_login() {
        let store = store();
        let user = store
            .add_user(UserDraft {
                username: "ops".to_string(),
                password: "secret1".to_string(),
                role: Role::User,
                full_name: "Ops Person".to_string(),
                email: None,
                created_by: Some(DEFAULT_ADMIN_USERNAME.to_string()),
            })
            .await
            .unwrap();

        store.delete_user(&admin_session(), &user.id).await.unwrap();

        // Soft delete: the record stays, deactivated.
        let users = store.list_users().await.unwrap();
        let got = users.iter().find(|u| u.id == user.id).unwrap();
        assert!(!got.is_active);

        let res = store.login("ops", "secret1").await;
        assert!(matches!(res, Err(Error::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_cannot_deactivate_own_account() {
        let store = store();
        let admin = store.list_users().await.unwrap().remove(0);
        let session = store
            .login(DEFAULT_ADMIN_USERNAME, DEFAULT_ADMIN_PASSWORD)
            .await
            .unwrap();

        let res = store.delete_user(&session, &admin.id).await;
        assert!(matches!(res, Err(Error::Forbidden(_))));
        assert!(store.list_users().await.unwrap()[0].is_active);
    }

    #[tokio::test]
    async fn test_blank_password_keeps_credential() {
        let store = store();
        let admin = store.list_users().await.unwrap().remove(0);

        store
            .update_user(
                &admin.id,
                UserPatch {
                    password: Some(String::new()),
                    full_name: Some("Root".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        store
            .login(DEFAULT_ADMIN_USERNAME, DEFAULT_ADMIN_PASSWORD)
            .await
            .unwrap();
        assert_eq!(store.list_users().await.unwrap()[0].full_name, "Root");
    }

    #[tokio::test]
    async fn test_bulk_add_appends_whole_batch() {
        let store = store();
        let drafts: Vec<AdvertisementDraft> = (0..3)
            .map(|i| AdvertisementDraft {
                name: format!("Lead {}", i),
                phone_no: format!("981234567{}", i),
                email: format!("lead{}@example.com", i),
                ..Default::default()
            })
            .collect();

        let added = store.bulk_add_advertisements(drafts).await.unwrap();
        assert_eq!(added.len(), 3);
        assert_eq!(store.list_advertisements().await.unwrap(), added);
    }
}
