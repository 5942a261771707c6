pub mod amount;

pub mod audio;

pub mod effects;

pub mod ledger;

pub mod stats;

pub mod test_helpers;
