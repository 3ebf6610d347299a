//! In-memory stores and helpers for Folio behaviour tests.
//!
//! The fakes implement the site's store traits and record every call, so
//! tests can assert which repository operation a flow chose.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p folio-integration-tests
//! ```

use std::io;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, TimeZone, Utc};
use secrecy::SecretString;

use folio_core::{
    AlbumId, Email, IconId, LoginIdentifier, PasscodeRoute, PhoneNumber, PhotoId, UserId,
};
use folio_site::captcha::{CaptchaIcon, ProofSigner};
use folio_site::db::{AlbumStore, IconStore, PhotoStore, RepositoryError, UserStore};
use folio_site::gallery::SearchTerms;
use folio_site::models::{Photo, PhotoAlbum, User};
use folio_site::services::{DeliveryError, Mailer, OutgoingMail};

/// Key used by test signers.
pub const TEST_SERVER_SECRET: &str = "q8Zr!v2Lm#T4wXp9@kD7^fHs";

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A fixed instant used as "now" by most tests.
///
/// # Panics
///
/// Never; the date is valid.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn noon(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
}

/// Proof signer keyed with [`TEST_SERVER_SECRET`].
///
/// # Panics
///
/// Never; HMAC accepts keys of any length.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn test_signer() -> ProofSigner {
    ProofSigner::new(&SecretString::from(TEST_SERVER_SECRET)).unwrap()
}

// =============================================================================
// Captcha icons
// =============================================================================

/// `count` distinct icons with IDs starting at 1.
#[must_use]
pub fn icons(count: usize) -> Vec<CaptchaIcon> {
    const NAMES: &[&str] = &[
        "anchor", "bicycle", "camera", "coffee", "heart", "leaf", "moon", "plane", "star",
        "tree", "umbrella", "bell",
    ];
    (1..=count)
        .map(|n| {
            let name = NAMES.get(n - 1).copied().unwrap_or("icon");
            CaptchaIcon {
                icon_id: IconId::new(i32::try_from(n).unwrap_or(i32::MAX)),
                icon: format!("fa-{name}"),
                name: format!("{name}-{n}"),
                colour: "red".to_string(),
            }
        })
        .collect()
}

/// Icon store returning the first `quantity` of a fixed set.
#[derive(Clone, Default)]
pub struct FakeIcons {
    icons: Arc<Vec<CaptchaIcon>>,
    requested: Arc<Mutex<Vec<usize>>>,
}

impl FakeIcons {
    #[must_use]
    pub fn new(icons: Vec<CaptchaIcon>) -> Self {
        Self {
            icons: Arc::new(icons),
            requested: Arc::default(),
        }
    }

    /// Quantities passed to `random_icons`, in call order.
    #[must_use]
    pub fn requested(&self) -> Vec<usize> {
        lock(&self.requested).clone()
    }
}

impl IconStore for FakeIcons {
    async fn random_icons(&self, quantity: usize) -> Result<Vec<CaptchaIcon>, RepositoryError> {
        lock(&self.requested).push(quantity);
        Ok(self.icons.iter().take(quantity).cloned().collect())
    }
}

// =============================================================================
// Gallery
// =============================================================================

/// A photo in album `album_id`.
#[must_use]
pub fn photo(id: i32, album_id: i32, title: &str, views: i64) -> Photo {
    Photo {
        id: PhotoId::new(id),
        album_id: AlbumId::new(album_id),
        title: title.to_string(),
        description: String::new(),
        file_name: format!("{id}.jpg"),
        views,
        created_at: noon(2026, 1, 1),
    }
}

/// An album without photos.
#[must_use]
pub fn album(id: i32, name: &str) -> PhotoAlbum {
    PhotoAlbum {
        id: AlbumId::new(id),
        name: name.to_string(),
        title: name.to_string(),
        description: String::new(),
        country: String::new(),
        photos: Vec::new(),
    }
}

/// A store operation observed by [`FakeGallery`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GalleryCall {
    FetchByName(String),
    FetchAlbumPhotos(AlbumId),
    SearchAlbumPhotos(AlbumId, Vec<String>),
    Search(Vec<String>),
    TopPhotos,
    RandomSelection,
}

impl GalleryCall {
    /// Whether this call fetched photos (as opposed to an album lookup).
    #[must_use]
    pub const fn fetches_photos(&self) -> bool {
        !matches!(self, Self::FetchByName(_))
    }
}

/// Album and photo store over fixed data.
///
/// Token matching is a case-insensitive prefix match on any word of the
/// title, every token required.
#[derive(Clone, Default)]
pub struct FakeGallery {
    albums: Arc<Vec<PhotoAlbum>>,
    photos: Arc<Vec<Photo>>,
    failing: bool,
    calls: Arc<Mutex<Vec<GalleryCall>>>,
}

impl FakeGallery {
    #[must_use]
    pub fn new(albums: Vec<PhotoAlbum>, photos: Vec<Photo>) -> Self {
        Self {
            albums: Arc::new(albums),
            photos: Arc::new(photos),
            failing: false,
            calls: Arc::default(),
        }
    }

    /// A gallery whose photo queries all fail. Album lookups still work.
    #[must_use]
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    /// Calls made so far.
    #[must_use]
    pub fn calls(&self) -> Vec<GalleryCall> {
        lock(&self.calls).clone()
    }

    fn record(&self, call: GalleryCall) -> Result<(), RepositoryError> {
        let fetches = call.fetches_photos();
        lock(&self.calls).push(call);
        if self.failing && fetches {
            return Err(RepositoryError::DataCorruption("store offline".to_string()));
        }
        Ok(())
    }

    fn matching<'a>(&'a self, terms: &'a SearchTerms) -> impl Iterator<Item = &'a Photo> {
        self.photos.iter().filter(move |p| {
            let title = p.title.to_lowercase();
            terms.iter().all(|token| {
                let token = token.to_lowercase();
                title.split_whitespace().any(|word| word.starts_with(&token))
            })
        })
    }
}

fn tokens(terms: &SearchTerms) -> Vec<String> {
    terms.tokens().to_vec()
}

impl AlbumStore for FakeGallery {
    async fn fetch_by_name(&self, name: &str) -> Result<Option<PhotoAlbum>, RepositoryError> {
        lock(&self.calls).push(GalleryCall::FetchByName(name.to_string()));
        Ok(self.albums.iter().find(|a| a.name == name).cloned())
    }

    async fn fetch_album_photos(&self, album: &PhotoAlbum) -> Result<Vec<Photo>, RepositoryError> {
        self.record(GalleryCall::FetchAlbumPhotos(album.id))?;
        Ok(self
            .photos
            .iter()
            .filter(|p| p.album_id == album.id)
            .cloned()
            .collect())
    }

    async fn search_album_photos(
        &self,
        album: &PhotoAlbum,
        terms: &SearchTerms,
    ) -> Result<Vec<Photo>, RepositoryError> {
        self.record(GalleryCall::SearchAlbumPhotos(album.id, tokens(terms)))?;
        Ok(self
            .matching(terms)
            .filter(|p| p.album_id == album.id)
            .cloned()
            .collect())
    }
}

impl PhotoStore for FakeGallery {
    async fn search(&self, terms: &SearchTerms) -> Result<Vec<Photo>, RepositoryError> {
        self.record(GalleryCall::Search(tokens(terms)))?;
        Ok(self.matching(terms).cloned().collect())
    }

    async fn top_photos(&self) -> Result<Vec<Photo>, RepositoryError> {
        self.record(GalleryCall::TopPhotos)?;
        let mut photos = self.photos.to_vec();
        photos.sort_by(|a, b| b.views.cmp(&a.views).then(b.id.cmp(&a.id)));
        Ok(photos)
    }

    async fn random_selection(&self) -> Result<Vec<Photo>, RepositoryError> {
        self.record(GalleryCall::RandomSelection)?;
        Ok(self.photos.to_vec())
    }
}

// =============================================================================
// Users and delivery
// =============================================================================

/// A user who receives magic links by email.
///
/// # Panics
///
/// Panics if `email` is not a valid address.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn email_user(id: i32, email: &str) -> User {
    User {
        id: UserId::new(id),
        email: Email::parse(email).unwrap(),
        phone: None,
        display_name: String::new(),
        passcode_route: PasscodeRoute::Email,
        magic_link: None,
        phone_code: None,
        login_attempts: 0,
        login_date: None,
    }
}

/// A user who receives codes by text message.
///
/// # Panics
///
/// Panics if `email` or `phone` is invalid.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn phone_user(id: i32, email: &str, phone: &str) -> User {
    User {
        phone: Some(PhoneNumber::parse(phone).unwrap()),
        passcode_route: PasscodeRoute::Phone,
        ..email_user(id, email)
    }
}

/// User store over a shared list.
#[derive(Clone, Default)]
pub struct FakeUsers {
    users: Arc<Mutex<Vec<User>>>,
}

impl FakeUsers {
    #[must_use]
    pub fn new(users: Vec<User>) -> Self {
        Self {
            users: Arc::new(Mutex::new(users)),
        }
    }

    /// Current state of a user.
    #[must_use]
    pub fn get(&self, id: UserId) -> Option<User> {
        lock(&self.users).iter().find(|u| u.id == id).cloned()
    }

    /// Overwrite a stored user, e.g. to backdate `login_date`.
    pub fn put(&self, user: User) {
        let mut users = lock(&self.users);
        if let Some(existing) = users.iter_mut().find(|u| u.id == user.id) {
            *existing = user;
        }
    }
}

impl UserStore for FakeUsers {
    async fn find_by_magic_link(&self, token: &str) -> Result<Option<User>, RepositoryError> {
        Ok(lock(&self.users)
            .iter()
            .find(|u| u.magic_link.as_deref() == Some(token))
            .cloned())
    }

    async fn find_by_login(
        &self,
        login: &LoginIdentifier,
    ) -> Result<Option<User>, RepositoryError> {
        Ok(lock(&self.users)
            .iter()
            .find(|u| match login {
                LoginIdentifier::Email(email) => &u.email == email,
                LoginIdentifier::Phone(phone) => u.phone.as_ref() == Some(phone),
            })
            .cloned())
    }

    async fn save_login_details(&self, user: &User) -> Result<bool, RepositoryError> {
        let mut users = lock(&self.users);
        let Some(existing) = users.iter_mut().find(|u| u.id == user.id) else {
            return Ok(false);
        };
        existing.magic_link.clone_from(&user.magic_link);
        existing.phone_code.clone_from(&user.phone_code);
        existing.login_attempts = user.login_attempts;
        existing.login_date = user.login_date;
        Ok(true)
    }
}

/// Mailer that keeps every message.
#[derive(Clone, Default)]
pub struct RecordingMailer {
    sent: Arc<Mutex<Vec<OutgoingMail>>>,
}

impl RecordingMailer {
    /// Messages sent so far.
    #[must_use]
    pub fn sent(&self) -> Vec<OutgoingMail> {
        lock(&self.sent).clone()
    }
}

impl Mailer for RecordingMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), DeliveryError> {
        lock(&self.sent).push(mail.clone());
        Ok(())
    }
}

/// In-memory sink for formatted log output.
#[derive(Debug, Clone, Default)]
pub struct LogCapture {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    /// Route `tracing` events at DEBUG and above into this capture for the
    /// current thread until the guard drops.
    #[must_use]
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let writer = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    /// Everything written so far.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&lock(&self.buffer)).into_owned()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        lock(&self.buffer).extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
