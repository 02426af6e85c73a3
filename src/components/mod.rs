pub(crate) mod control_panel;
pub(crate) mod draggable_note;
pub(crate) mod hooks;
pub(crate) mod profile_card;
pub(crate) mod ui;

pub(crate) use control_panel::ControlPanel;
pub(crate) use profile_card::{ProfileCard, SkeletonProfileCard};
