use super::*;
use crate::api::types::Friend;
use crate::api::VrcApi;

impl VrSleepCore {
    /// Full friends list, paginated through on the caller's behalf.
    pub async fn friends(&self) -> Result<Vec<Friend>> {
        self.api.get_friends().await
    }
}
