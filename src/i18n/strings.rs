// UI string tables. Lookups fall back to the default language, then to the key.
use once_cell::sync::Lazy;
use std::collections::HashMap;

pub const FALLBACK_LANGUAGE: &str = "it";

type Table = HashMap<&'static str, &'static str>;

static TABLES: Lazy<HashMap<&'static str, Table>> = Lazy::new(|| {
    let mut tables = HashMap::new();
    tables.insert(
        "it",
        HashMap::from([
            ("language.name", "Italiano"),
            ("language.label", "Lingua"),
            ("nav.home", "Percorso"),
            ("nav.map", "Mappa"),
            ("intro.heading", "Introduzione"),
            ("stops.heading", "Tappe"),
            ("player.play", "Ascolta"),
            ("player.pause", "Pausa"),
            ("player.failed", "Impossibile riprodurre l'audio. Riprova più tardi."),
            ("transcript.show", "Mostra trascrizione"),
            ("transcript.hide", "Nascondi trascrizione"),
            ("transcript.loading", "Caricamento trascrizione..."),
            ("transcript.error", "Impossibile caricare la trascrizione"),
            ("map.reset", "Centra mappa"),
            ("map.open", "Apri in Google Maps"),
            ("map.show", "Vedi sulla mappa"),
            ("map.select", "Seleziona una tappa sulla mappa"),
            ("map.unavailable", "Mappa non disponibile"),
            ("stop.duration", "Durata"),
            ("tour.loading", "Caricamento del percorso..."),
            ("tour.error", "Impossibile caricare il percorso"),
            ("footer.credits", "Audioguida realizzata dal comitato di quartiere"),
            ("footer.rights", "Tutti i diritti riservati"),
            ("footer.contact", "Contatti"),
        ]),
    );
    tables.insert(
        "en",
        HashMap::from([
            ("language.name", "English"),
            ("language.label", "Language"),
            ("nav.home", "Tour"),
            ("nav.map", "Map"),
            ("intro.heading", "Introduction"),
            ("stops.heading", "Stops"),
            ("player.play", "Listen"),
            ("player.pause", "Pause"),
            ("player.failed", "Unable to play the audio. Please try again later."),
            ("transcript.show", "Show transcript"),
            ("transcript.hide", "Hide transcript"),
            ("transcript.loading", "Loading transcript..."),
            ("transcript.error", "Unable to load the transcript"),
            ("map.reset", "Reset map"),
            ("map.open", "Open in Google Maps"),
            ("map.show", "Show on map"),
            ("map.select", "Select a stop on the map"),
            ("map.unavailable", "Map unavailable"),
            ("stop.duration", "Duration"),
            ("tour.loading", "Loading the tour..."),
            ("tour.error", "Unable to load the tour"),
            ("footer.credits", "Audio guide produced by the neighbourhood committee"),
            ("footer.rights", "All rights reserved"),
            ("footer.contact", "Contact"),
        ]),
    );
    tables.insert(
        "fr",
        HashMap::from([
            ("language.name", "Français"),
            ("language.label", "Langue"),
            ("nav.home", "Parcours"),
            ("nav.map", "Carte"),
            ("intro.heading", "Introduction"),
            ("stops.heading", "Étapes"),
            ("player.play", "Écouter"),
            ("player.pause", "Pause"),
            ("player.failed", "Impossible de lire l'audio. Réessayez plus tard."),
            ("transcript.show", "Afficher la transcription"),
            ("transcript.hide", "Masquer la transcription"),
            ("transcript.loading", "Chargement de la transcription..."),
            ("transcript.error", "Impossible de charger la transcription"),
            ("map.reset", "Recentrer la carte"),
            ("map.open", "Ouvrir dans Google Maps"),
            ("map.show", "Voir sur la carte"),
            ("map.select", "Sélectionnez une étape sur la carte"),
            ("stop.duration", "Durée"),
            ("tour.loading", "Chargement du parcours..."),
            ("tour.error", "Impossible de charger le parcours"),
            ("footer.credits", "Audioguide réalisé par le comité de quartier"),
            ("footer.rights", "Tous droits réservés"),
            ("footer.contact", "Contact"),
        ]),
    );
    tables
});

/// Translate `key` for `lang`.
pub fn tr(lang: &str, key: &str) -> String {
    TABLES
        .get(lang)
        .and_then(|table| table.get(key))
        .or_else(|| TABLES.get(FALLBACK_LANGUAGE).and_then(|table| table.get(key)))
        .map(|value| value.to_string())
        .unwrap_or_else(|| key.to_string())
}

pub fn language_label(code: &str) -> String {
    TABLES
        .get(code)
        .and_then(|table| table.get("language.name"))
        .map(|value| value.to_string())
        .unwrap_or_else(|| code.to_ascii_uppercase())
}

pub fn has_table(code: &str) -> bool {
    TABLES.contains_key(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_default_then_key() {
        assert_eq!(tr("en", "nav.map"), "Map");
        // "map.unavailable" has no French entry.
        assert_eq!(tr("fr", "map.unavailable"), "Mappa non disponibile");
        assert_eq!(tr("de", "nav.map"), "Mappa");
        assert_eq!(tr("en", "no.such.key"), "no.such.key");
    }

    #[test]
    fn language_labels() {
        assert_eq!(language_label("fr"), "Français");
        assert_eq!(language_label("xx"), "XX");
        assert!(has_table("it"));
    }
}
