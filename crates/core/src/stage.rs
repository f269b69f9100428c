//! Sales funnel stages
//!
//! Stages gate which content a reply may contain. The first three stages
//! are "early": replies shown there must not talk about prices, scheduling
//! or payment links.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Position of the conversation in the sales funnel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SalesStage {
    /// First contact, building rapport
    #[default]
    Integration,
    /// Understanding goals and situation
    Discovery,
    /// Working through doubts
    ObjectionHandling,
    /// Confirming fit before the offer
    PreClose,
    /// Presenting the offer and payment
    Close,
    /// After enrollment
    PostClose,
}

impl SalesStage {
    /// All stages in funnel order
    pub const ALL: [SalesStage; 6] = [
        SalesStage::Integration,
        SalesStage::Discovery,
        SalesStage::ObjectionHandling,
        SalesStage::PreClose,
        SalesStage::Close,
        SalesStage::PostClose,
    ];

    /// Tag used as variant and stats key
    pub fn as_str(&self) -> &'static str {
        match self {
            SalesStage::Integration => "integration",
            SalesStage::Discovery => "discovery",
            SalesStage::ObjectionHandling => "objection_handling",
            SalesStage::PreClose => "pre_close",
            SalesStage::Close => "close",
            SalesStage::PostClose => "post_close",
        }
    }

    /// Human-readable label used in explanations
    pub fn display_name(&self) -> &'static str {
        match self {
            SalesStage::Integration => "Integración",
            SalesStage::Discovery => "Descubrimiento",
            SalesStage::ObjectionHandling => "Manejo de objeciones",
            SalesStage::PreClose => "Pre-cierre",
            SalesStage::Close => "Cierre",
            SalesStage::PostClose => "Post-cierre",
        }
    }

    /// Early stages forbid pricing, scheduling and payment content
    pub fn is_early(&self) -> bool {
        matches!(
            self,
            SalesStage::Integration | SalesStage::Discovery | SalesStage::ObjectionHandling
        )
    }

    /// Generic guidance for generated replies at this stage
    pub fn guidance(&self) -> &'static str {
        match self {
            SalesStage::Integration => {
                "Saluda con calidez, crea confianza y haz una sola pregunta abierta."
            },
            SalesStage::Discovery => {
                "Entiende su objetivo y su situación actual. Pregunta antes de proponer."
            },
            SalesStage::ObjectionHandling => {
                "Valida la duda, responde con un dato concreto y ofrece un siguiente paso suave."
            },
            SalesStage::PreClose => {
                "Resume cómo el programa encaja con su objetivo y confirma que no queden dudas."
            },
            SalesStage::Close => {
                "Presenta la oferta con claridad, incluyendo inversión y forma de inscripción."
            },
            SalesStage::PostClose => {
                "Da la bienvenida, confirma los próximos pasos y refuerza la decisión."
            },
        }
    }
}

impl fmt::Display for SalesStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SalesStage {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c == '-' || c == ' ' { '_' } else { c })
            .collect();

        match key.as_str() {
            "integration" | "integracion" | "integración" => Ok(SalesStage::Integration),
            "discovery" | "descubrimiento" => Ok(SalesStage::Discovery),
            "objection_handling" | "objections" | "objeciones" => {
                Ok(SalesStage::ObjectionHandling)
            },
            "pre_close" | "preclose" | "precierre" | "pre_cierre" => Ok(SalesStage::PreClose),
            "close" | "cierre" => Ok(SalesStage::Close),
            "post_close" | "postclose" | "postcierre" | "post_cierre" => Ok(SalesStage::PostClose),
            _ => Err(Error::InvalidInput(format!("unknown stage '{}'", s.trim()))),
        }
    }
}
