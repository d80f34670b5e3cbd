//! Barista Domain Concerns

pub mod cart;
pub mod checkout;
pub mod gift_cards;
pub mod loyalty;
pub mod orders;
pub mod products;
pub mod session;

/// Where a list of records was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    /// The copy kept on this device.
    Local,

    /// The backend.
    Remote,
}

/// Data paired with a disclosure of where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sourced<T> {
    /// The records.
    pub data: T,

    /// Where they were read from.
    pub source: DataSource,
}

impl<T> Sourced<T> {
    /// Data read from this device.
    pub fn local(data: T) -> Self {
        Self {
            data,
            source: DataSource::Local,
        }
    }

    /// Data fetched from the backend.
    pub fn remote(data: T) -> Self {
        Self {
            data,
            source: DataSource::Remote,
        }
    }

    /// Whether the data came from this device.
    pub fn is_local(&self) -> bool {
        self.source == DataSource::Local
    }
}
