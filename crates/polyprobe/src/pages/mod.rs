//! Page objects for the search home page, the webmail landing page, the
//! image search page and the bot-check challenge.

mod challenge;
mod home;
mod images;
mod mail;

pub use challenge::ChallengePage;
pub use home::{HomePage, HomeSelectors};
pub use images::{ImagesPage, ImagesSelectors};
pub use mail::{MailPage, MailSelectors};

use crate::translations::Resolver;

/// Every page object, sharing one resolver
#[derive(Debug, Clone)]
pub struct Pages {
    /// Search home page
    pub home: HomePage,
    /// Webmail landing page
    pub mail: MailPage,
    /// Image search page
    pub images: ImagesPage,
    /// Bot-check challenge
    pub challenge: ChallengePage,
}

impl Pages {
    /// Build all page objects over `resolver`
    #[must_use]
    pub fn new(resolver: &Resolver) -> Self {
        Self {
            home: HomePage::new(resolver.clone()),
            mail: MailPage::new(resolver.clone()),
            images: ImagesPage::new(resolver.clone()),
            challenge: ChallengePage::new(resolver.clone()),
        }
    }
}
