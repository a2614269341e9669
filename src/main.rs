use dioxus::prelude::*;

mod api;
mod components;
mod config;
mod db;
mod events;
mod i18n;

use components::AppShell;

const TOUR_CSS: Asset = asset!("/assets/styling/tour.css");
const LEAFLET_CSS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.css";
const LEAFLET_JS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.js";

fn main() {
    dioxus::launch(App);
}

#[component]
fn App() -> Element {
    rsx! {
        document::Meta { name: "viewport", content: "width=device-width, initial-scale=1" }
        document::Meta { name: "theme-color", content: "#2f4858" }

        document::Stylesheet { href: LEAFLET_CSS }
        document::Stylesheet { href: TOUR_CSS }
        document::Script { src: LEAFLET_JS }

        AppShell {}
    }
}
