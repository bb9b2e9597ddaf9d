//! Display metadata for the historic TIC label set.
//!
//! This table is presentation-layer configuration: friendly names, units and
//! icons for the data groups a meter can emit. Nothing in the decoder or the
//! store consults it; it exists for consumers that surface fields to users.

/// Presentation metadata for one TIC label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelInfo {
    /// Label as transmitted by the meter.
    pub label: &'static str,
    /// Human-readable name.
    pub name: &'static str,
    /// Unit of measurement, empty for opaque tokens.
    pub unit: &'static str,
    /// Suggested display icon.
    pub icon: &'static str,
}

/// The historic mode label set.
pub const LABELS: &[LabelInfo] = &[
    LabelInfo { label: "ADCO", name: "Contrat", unit: "", icon: "mdi:numeric" },
    LabelInfo { label: "OPTARIF", name: "Option tarifaire", unit: "", icon: "mdi:file-document-edit" },
    LabelInfo { label: "ISOUSC", name: "Intensité souscrite", unit: "A", icon: "mdi:information-outline" },
    LabelInfo { label: "HCHC", name: "Heures creuses", unit: "Wh", icon: "mdi:timelapse" },
    LabelInfo { label: "HCHP", name: "Heures pleines", unit: "Wh", icon: "mdi:timelapse" },
    LabelInfo { label: "PTEC", name: "Période tarifaire", unit: "", icon: "mdi:clock-outline" },
    LabelInfo { label: "IINST", name: "Intensité instantanée", unit: "A", icon: "mdi:current-ac" },
    LabelInfo { label: "IMAX", name: "Intensité max", unit: "A", icon: "mdi:format-vertical-align-top" },
    LabelInfo { label: "PAPP", name: "Puissance apparente", unit: "VA", icon: "mdi:flash" },
    LabelInfo { label: "HHPHC", name: "Groupe horaire", unit: "", icon: "mdi:av-timer" },
    LabelInfo { label: "MOTDETAT", name: "Mot d'état", unit: "", icon: "mdi:check" },
    LabelInfo { label: "BASE", name: "Base", unit: "Wh", icon: "" },
    LabelInfo { label: "EJP HN", name: "EJP heures normales", unit: "Wh", icon: "" },
    LabelInfo { label: "EJP HPM", name: "EJP heures de pointe", unit: "Wh", icon: "" },
    LabelInfo { label: "PEJP", name: "EJP préavis", unit: "Wh", icon: "" },
    LabelInfo { label: "BBR HC JB", name: "Tempo heures bleues creuses", unit: "Wh", icon: "" },
    LabelInfo { label: "BBR HP JB", name: "Tempo heures bleues pleines", unit: "Wh", icon: "" },
    LabelInfo { label: "BBR HC JW", name: "Tempo heures blanches creuses", unit: "Wh", icon: "" },
    LabelInfo { label: "BBR HP JW", name: "Tempo heures blanches pleines", unit: "Wh", icon: "" },
    LabelInfo { label: "BBR HC JR", name: "Tempo heures rouges creuses", unit: "Wh", icon: "" },
    LabelInfo { label: "BBR HP JR", name: "Tempo heures rouges pleines", unit: "Wh", icon: "" },
    LabelInfo { label: "DEMAIN", name: "Tempo couleur demain", unit: "", icon: "" },
    LabelInfo { label: "ADPS", name: "Dépassement de puissance", unit: "A", icon: "" },
];

/// Looks metadata up by label, case-insensitively.
pub fn lookup(key: &str) -> Option<&'static LabelInfo> {
    let key = key.to_ascii_uppercase();
    LABELS.iter().find(|info| info.label == key)
}
