use leptos::prelude::*;
use leptos_ui::variants;

variants! {
    Button {
        base: "inline-flex items-center justify-center gap-2 whitespace-nowrap border border-black text-sm font-medium transition-colors disabled:pointer-events-none disabled:cursor-not-allowed disabled:bg-gray-400 [&_svg]:pointer-events-none [&_svg:not([class*='size-'])]:size-4 shrink-0 [&_svg]:shrink-0 outline-none focus-visible:ring-2 focus-visible:ring-black/40 w-fit hover:cursor-pointer active:scale-[0.98] select-none",
        variants: {
            variant: {
                Default: "bg-blue-500 text-white hover:bg-blue-600",
                Destructive: "bg-red-500 text-white hover:bg-red-600",
                Success: "bg-green-500 text-white hover:bg-green-600",
                Outline: "bg-white text-black hover:bg-gray-100",
            },
            size: {
                Default: "px-4 py-2",
                Sm: "px-3 py-1",
            }
        },
        component: {
            element: button,
            support_href: true,
            support_aria_current: true
        }
    }
}
