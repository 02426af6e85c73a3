pub(crate) mod use_notes;

pub(crate) use use_notes::*;
