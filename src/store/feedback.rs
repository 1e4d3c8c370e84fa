use log::{error, info};

use crate::store::traits::{Confirmer, Notifier};

/// Notifier that only writes to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn progress(&self, message: &str) {
        info!("{}", message);
    }

    fn success(&self, message: &str) {
        info!("{}", message);
    }

    fn failure(&self, message: &str) {
        error!("{}", message);
    }
}

/// Confirmer with a fixed answer, for headless callers
#[derive(Debug, Clone, Copy)]
pub struct FixedConfirmer(pub bool);

#[async_trait::async_trait]
impl Confirmer for FixedConfirmer {
    async fn confirm(&self, _prompt: &str) -> bool {
        self.0
    }
}
