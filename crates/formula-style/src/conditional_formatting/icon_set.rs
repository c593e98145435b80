use serde::{Deserialize, Serialize};

use super::threshold::{validate_threshold_sequence, Threshold};
use crate::FormatError;

ooxml_token_enum! {
    /// Built-in icon sets (`iconSet/@iconSet`).
    pub enum IconSetKind {
        ThreeArrows => "3Arrows" | "3_arrows",
        ThreeArrowsGray => "3ArrowsGray" | "3_arrows_gray",
        ThreeFlags => "3Flags" | "3_flags",
        ThreeTrafficLights1 => "3TrafficLights1" | "3_traffic_lights" | "3_traffic_lights_1",
        ThreeTrafficLights2 => "3TrafficLights2" | "3_traffic_lights_2" | "3_traffic_lights_rimmed",
        ThreeSigns => "3Signs" | "3_signs",
        ThreeSymbols => "3Symbols" | "3_symbols" | "3_symbols_circled",
        ThreeSymbols2 => "3Symbols2" | "3_symbols_2",
        ThreeStars => "3Stars" | "3_stars",
        ThreeTriangles => "3Triangles" | "3_triangles",
        FourArrows => "4Arrows" | "4_arrows",
        FourArrowsGray => "4ArrowsGray" | "4_arrows_gray",
        FourRedToBlack => "4RedToBlack" | "4_red_to_black",
        FourRating => "4Rating" | "4_rating",
        FourTrafficLights => "4TrafficLights" | "4_traffic_lights",
        FiveArrows => "5Arrows" | "5_arrows",
        FiveArrowsGray => "5ArrowsGray" | "5_arrows_gray",
        FiveRating => "5Rating" | "5_rating",
        FiveQuarters => "5Quarters" | "5_quarters",
        FiveBoxes => "5Boxes" | "5_boxes",
    }
}

impl IconSetKind {
    pub fn icon_count(self) -> usize {
        use IconSetKind::*;
        match self {
            ThreeArrows | ThreeArrowsGray | ThreeFlags | ThreeTrafficLights1
            | ThreeTrafficLights2 | ThreeSigns | ThreeSymbols | ThreeSymbols2 | ThreeStars
            | ThreeTriangles => 3,
            FourArrows | FourArrowsGray | FourRedToBlack | FourRating | FourTrafficLights => 4,
            FiveArrows | FiveArrowsGray | FiveRating | FiveQuarters | FiveBoxes => 5,
        }
    }
}

/// Icon set rule parameters.
///
/// `thresholds` are the boundaries *between* icons, so there is always one fewer than the set
/// has icons. The implicit lower bound of the first icon is not stored; see [`IconSetRule::cfvos`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IconSetRule {
    pub set: IconSetKind,
    pub thresholds: Vec<Threshold>,
    #[serde(default)]
    pub reverse: bool,
    #[serde(default = "crate::serde_defaults::default_true")]
    pub show_value: bool,
}

impl IconSetRule {
    pub fn new(set: IconSetKind, thresholds: Vec<Threshold>) -> Self {
        Self {
            set,
            thresholds,
            reverse: false,
            show_value: true,
        }
    }

    /// Evenly spaced percent thresholds, as Excel creates them by default.
    pub fn with_default_thresholds(set: IconSetKind) -> Self {
        let count = set.icon_count();
        let thresholds = (1..count)
            .map(|i| Threshold::Percent((100.0 * i as f64 / count as f64).round()))
            .collect();
        Self::new(set, thresholds)
    }

    /// The full value-object list a serializer writes: a synthetic `percent 0` followed by the
    /// stored thresholds.
    pub fn cfvos(&self) -> Vec<Threshold> {
        std::iter::once(Threshold::Percent(0.0))
            .chain(self.thresholds.iter().cloned())
            .collect()
    }

    pub fn validate(&self) -> Result<(), FormatError> {
        let expected = self.set.icon_count() - 1;
        if self.thresholds.len() != expected {
            return Err(FormatError::invalid_parameters(format!(
                "icon set {} needs {expected} thresholds, got {}",
                self.set,
                self.thresholds.len()
            )));
        }
        let refs: Vec<&Threshold> = self.thresholds.iter().collect();
        validate_threshold_sequence(&refs, "icon set")
    }
}
