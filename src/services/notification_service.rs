use slack::SlackClient;

use crate::errors::WatchResult;

#[cfg_attr(test, mockall::automock)]
pub trait Notify: Send + Sync {
    /// One delivery attempt. Token and channel are parameters because they
    /// come from stored settings, read at run time.
    fn send(&self, token: &str, channel: &str, text: &str) -> WatchResult<()>;
}

pub struct SlackNotifier {
    client: SlackClient,
}

impl SlackNotifier {
    pub fn new() -> WatchResult<Self> {
        Ok(Self {
            client: SlackClient::new()?,
        })
    }
}

impl Notify for SlackNotifier {
    fn send(&self, token: &str, channel: &str, text: &str) -> WatchResult<()> {
        self.client.send_message(token, channel, text)?;
        Ok(())
    }
}
