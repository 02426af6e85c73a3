use leptos::prelude::*;
use leptos_ui::clx;

mod components {
    use super::*;
    clx! {Panel, div, "flex h-fit w-100 flex-col border-2 border-dashed divide-y divide-black bg-gray-50"}
    clx! {PanelSection, section, "flex flex-col gap-3 py-3 px-4"}
    clx! {PanelTitle, h2, "leading-none"}
    clx! {PanelHint, p, "text-sm opacity-50 flex items-center flex-wrap gap-2"}
    clx! {PanelFootnote, p, "text-xs text-gray-600"}
}

pub use components::*;
