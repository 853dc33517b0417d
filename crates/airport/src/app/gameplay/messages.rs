use std::collections::BTreeMap;
use std::time::Duration;

/// Which condition produced a message. Each channel holds at most one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) enum MessageChannel {
    Security,
    CheckIn,
    Shop,
    Boarding,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct MessageDurations {
    pub(crate) outcome: Duration,
    pub(crate) purchase: Duration,
}

impl Default for MessageDurations {
    fn default() -> Self {
        Self {
            outcome: Duration::from_millis(2000),
            purchase: Duration::from_millis(1500),
        }
    }
}

impl MessageDurations {
    fn for_channel(&self, channel: MessageChannel) -> Duration {
        match channel {
            MessageChannel::Shop => self.purchase,
            MessageChannel::Security | MessageChannel::CheckIn | MessageChannel::Boarding => {
                self.outcome
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TransientMessage {
    pub(crate) text: String,
    pub(crate) expires_at: Duration,
}

/// Transient on-screen feedback keyed by channel, expired against the session clock.
#[derive(Debug, Clone, Default)]
pub(crate) struct Messages {
    durations: MessageDurations,
    slots: BTreeMap<MessageChannel, TransientMessage>,
}

impl Messages {
    pub(crate) fn new(durations: MessageDurations) -> Self {
        Self {
            durations,
            slots: BTreeMap::new(),
        }
    }

    /// Replaces whatever the channel showed; the new message gets a fresh expiry.
    pub(crate) fn show(&mut self, channel: MessageChannel, text: impl Into<String>, now: Duration) {
        let expires_at = now.saturating_add(self.durations.for_channel(channel));
        self.slots.insert(
            channel,
            TransientMessage {
                text: text.into(),
                expires_at,
            },
        );
    }

    pub(crate) fn expire(&mut self, now: Duration) {
        self.slots.retain(|_, message| now < message.expires_at);
    }

    #[cfg(test)]
    pub(crate) fn get(&self, channel: MessageChannel) -> Option<&str> {
        self.slots.get(&channel).map(|message| message.text.as_str())
    }

    pub(crate) fn is_showing(&self, channel: MessageChannel) -> bool {
        self.slots.contains_key(&channel)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (MessageChannel, &str)> {
        self.slots
            .iter()
            .map(|(channel, message)| (*channel, message.text.as_str()))
    }
}
