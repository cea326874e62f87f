use std::sync::Arc;

use campus_auth::{AuthOptions, Authenticator, Bootstrap, PasswordHasher, SessionTokens};
use campus_core::Datastore;

/// Shared state behind every route.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Datastore>,
    pub options: Arc<AuthOptions>,
    pub hasher: PasswordHasher,
    pub tokens: SessionTokens,
    pub auth: Arc<Authenticator>,
    pub bootstrap: Arc<Bootstrap>,
}

impl AppState {
    pub fn new(options: AuthOptions, store: Arc<dyn Datastore>) -> Self {
        let hasher = PasswordHasher::new(options.password.clone());
        let tokens = SessionTokens::new(options.jwt.clone());
        let auth = Arc::new(Authenticator::new(
            Arc::clone(&store),
            hasher.clone(),
            tokens.clone(),
        ));
        let bootstrap = Arc::new(Bootstrap::new(Arc::clone(&store), hasher.clone()));
        Self {
            store,
            options: Arc::new(options),
            hasher,
            tokens,
            auth,
            bootstrap,
        }
    }
}
