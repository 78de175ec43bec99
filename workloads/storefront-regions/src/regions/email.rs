//! Product watch e-mail, HTML detail part.

use async_trait::async_trait;

use region_client::Region;

/// Region path of the watch e-mail detail part.
pub const EMAIL_WATCH_DETAIL: &str = "email/watch/html/detail";

/// Lists the watched products passed in as `extProducts`.
///
/// Has no data of its own; children configured under
/// `client/html/email/watch/html/detail/default/subparts` are composed into it.
#[derive(Debug, Clone, Default)]
pub struct EmailWatchDetail;

#[async_trait]
impl Region for EmailWatchDetail {
    fn path(&self) -> &str {
        EMAIL_WATCH_DETAIL
    }
}
