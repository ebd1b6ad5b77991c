//! Customer identifiers carried through a conversation

use rand::Rng;
use serde::{Deserialize, Serialize};

const CONFIRMATION_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const CONFIRMATION_LEN: usize = 6;

/// Customer context for one conversation.
///
/// `account_number` is assigned when the conversation is created. The booking
/// references (`confirmation_number`, `flight_number`) are filled lazily by
/// the specialists that need them and are never overwritten once set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirlineContext {
    #[serde(default)]
    pub passenger_name: Option<String>,
    #[serde(default)]
    pub confirmation_number: Option<String>,
    #[serde(default)]
    pub seat_number: Option<String>,
    #[serde(default)]
    pub flight_number: Option<String>,
    #[serde(default)]
    pub account_number: Option<String>,
}

/// A change to the context requested by a successful tool call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum ContextUpdate {
    SeatNumber(String),
}

impl AirlineContext {
    /// Fresh context for a new conversation, with a random 8-digit account number
    pub fn for_new_conversation(rng: &mut impl Rng) -> Self {
        Self {
            account_number: Some(rng.gen_range(10_000_000..=99_999_999u32).to_string()),
            ..Self::default()
        }
    }

    /// Fill in missing booking references. Existing values are kept.
    ///
    /// Returns true if anything was generated.
    pub fn ensure_booking_refs(&mut self, rng: &mut impl Rng) -> bool {
        let mut changed = false;
        if self.confirmation_number.is_none() {
            self.confirmation_number = Some(random_confirmation(rng));
            changed = true;
        }
        if self.flight_number.is_none() {
            self.flight_number = Some(format!("FLT-{}", rng.gen_range(100..=999)));
            changed = true;
        }
        changed
    }

    pub fn apply(&mut self, update: ContextUpdate) {
        match update {
            ContextUpdate::SeatNumber(seat) => self.seat_number = Some(seat),
        }
    }
}

fn random_confirmation(rng: &mut impl Rng) -> String {
    (0..CONFIRMATION_LEN)
        .map(|_| char::from(CONFIRMATION_ALPHABET[rng.gen_range(0..CONFIRMATION_ALPHABET.len())]))
        .collect()
}
