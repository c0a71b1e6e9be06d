//! Ordered image slots that fill front to back and empty back to front

use thiserror::Error;

use super::types::IMAGE_SLOTS;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageChainError {
    #[error("image slot {slot} does not exist")]
    NoSuchSlot { slot: usize },
    #[error("upload image {previous} before image {current}", previous = .slot, current = .slot + 1)]
    PreviousEmpty { slot: usize },
    #[error("remove image {next} before image {current}", current = .slot + 1, next = .slot + 2)]
    NextFilled { slot: usize },
}

/// Four image slots kept gap-free
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageChain {
    slots: [Option<String>; IMAGE_SLOTS],
}

impl ImageChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from URLs in order; extra URLs beyond the slot count are dropped
    pub fn from_urls<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut chain = Self::new();
        for (slot, url) in urls.into_iter().take(IMAGE_SLOTS).enumerate() {
            chain.slots[slot] = Some(url.into());
        }
        chain
    }

    /// Rebuild from stored slots, compacting any gaps
    pub fn from_slots(slots: &[Option<String>; IMAGE_SLOTS]) -> Self {
        Self::from_urls(slots.iter().flatten().cloned())
    }

    pub fn slots(&self) -> &[Option<String>; IMAGE_SLOTS] {
        &self.slots
    }

    pub fn get(&self, slot: usize) -> Option<&str> {
        self.slots.get(slot).and_then(|s| s.as_deref())
    }

    /// Whether `slot` may receive an upload now
    pub fn can_set(&self, slot: usize) -> Result<(), ImageChainError> {
        if slot >= IMAGE_SLOTS {
            return Err(ImageChainError::NoSuchSlot { slot });
        }
        if slot > 0 && self.slots[slot - 1].is_none() {
            return Err(ImageChainError::PreviousEmpty { slot });
        }
        Ok(())
    }

    /// Store `url` in `slot`, replacing any image already there
    pub fn set(&mut self, slot: usize, url: impl Into<String>) -> Result<(), ImageChainError> {
        self.can_set(slot)?;
        self.slots[slot] = Some(url.into());
        Ok(())
    }

    /// Empty `slot`; refused while the slot after it holds an image
    pub fn clear(&mut self, slot: usize) -> Result<Option<String>, ImageChainError> {
        if slot >= IMAGE_SLOTS {
            return Err(ImageChainError::NoSuchSlot { slot });
        }
        if slot + 1 < IMAGE_SLOTS && self.slots[slot + 1].is_some() {
            return Err(ImageChainError::NextFilled { slot });
        }
        Ok(self.slots[slot].take())
    }

    /// First empty slot, if any
    pub fn next_open_slot(&self) -> Option<usize> {
        self.slots.iter().position(Option::is_none)
    }

    /// Filled URLs in order
    pub fn filled(&self) -> Vec<String> {
        self.slots.iter().flatten().cloned().collect()
    }

    pub fn filled_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.filled_count() == 0
    }
}
