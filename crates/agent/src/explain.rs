//! Explanation Builder
//!
//! Deterministic lookups that tell the salesperson why a reply was chosen
//! and what to do next. Both tables carry a default entry for keys they do
//! not list.

use sales_assist_core::{Intent, SalesStage};

/// Bullet prefix used in the rationale
pub const BULLET: &str = "• ";

/// intent -> rationale bullet
const INTENT_RATIONALE: &[(Intent, &str)] = &[
    (
        Intent::Time,
        "Detecté falta de tiempo: la respuesta propone sesiones cortas diarias en lugar de bloques largos.",
    ),
    (
        Intent::Price,
        "Preguntó por el precio: primero se refuerza el valor y el resultado antes de hablar de montos.",
    ),
    (
        Intent::Certification,
        "Le importa la certificación: se menciona el respaldo del programa y cómo se obtiene el certificado.",
    ),
    (
        Intent::Employment,
        "Busca salida laboral: se conecta el programa con habilidades que piden las empresas.",
    ),
    (
        Intent::Competitor,
        "Compara con otras opciones: se destacan diferencias concretas sin hablar mal de nadie.",
    ),
    (
        Intent::Pitch,
        "Pidió información: se da un resumen breve y se invita a elegir cómo seguir.",
    ),
];

const DEFAULT_RATIONALE: &str =
    "Mensaje general: se mantiene la conversación abierta con una pregunta sencilla.";

/// stage -> next-step sentence
const STAGE_NEXT_STEP: &[(SalesStage, &str)] = &[
    (
        SalesStage::Integration,
        "Genera confianza y pregunta qué lo trajo hasta aquí.",
    ),
    (
        SalesStage::Discovery,
        "Haz una pregunta abierta para entender su objetivo y su disponibilidad.",
    ),
    (
        SalesStage::ObjectionHandling,
        "Valida la objeción y ofrece elegir entre la ruta rápida o el plan completo.",
    ),
    (
        SalesStage::PreClose,
        "Resume los beneficios acordados y confirma si quiere ver la inversión.",
    ),
    (
        SalesStage::Close,
        "Comparte el enlace de inscripción y acompaña el pago.",
    ),
    (
        SalesStage::PostClose,
        "Da la bienvenida y explica los primeros pasos del curso.",
    ),
];

const DEFAULT_NEXT_STEP: &str = "Escucha con atención y responde con una pregunta abierta.";

/// Inputs of the rationale
#[derive(Debug, Clone, Copy)]
pub struct WhyContext<'a> {
    pub name: Option<&'a str>,
    pub intent: Intent,
    pub stage: Option<SalesStage>,
    pub context_note: Option<&'a str>,
}

impl<'a> WhyContext<'a> {
    pub fn new(intent: Intent) -> Self {
        Self {
            name: None,
            intent,
            stage: None,
            context_note: None,
        }
    }

    pub fn with_name(mut self, name: Option<&'a str>) -> Self {
        self.name = name;
        self
    }

    pub fn with_stage(mut self, stage: SalesStage) -> Self {
        self.stage = Some(stage);
        self
    }

    pub fn with_context_note(mut self, note: Option<&'a str>) -> Self {
        self.context_note = note;
        self
    }
}

/// Rationale bullet for an intent
pub fn intent_rationale(intent: Intent) -> &'static str {
    INTENT_RATIONALE
        .iter()
        .find(|(key, _)| *key == intent)
        .map(|(_, text)| *text)
        .unwrap_or(DEFAULT_RATIONALE)
}

/// Build the multi-line rationale
pub fn build_why(ctx: &WhyContext<'_>) -> String {
    let mut lines = Vec::with_capacity(4);

    if let Some(name) = ctx.name.map(str::trim).filter(|n| !n.is_empty()) {
        lines.push(format!("{}, esto es lo que tuve en cuenta:", name));
    }

    lines.push(format!("{}{}", BULLET, intent_rationale(ctx.intent)));

    if let Some(stage) = ctx.stage {
        lines.push(format!("{}Etapa: {}.", BULLET, stage.display_name()));
    }

    if let Some(note) = ctx.context_note.map(str::trim).filter(|n| !n.is_empty()) {
        lines.push(format!("{}Nota: {}", BULLET, note));
    }

    lines.join("\n")
}

/// Suggested next action for a stage
pub fn build_next_step(stage: SalesStage) -> String {
    STAGE_NEXT_STEP
        .iter()
        .find(|(key, _)| *key == stage)
        .map(|(_, text)| *text)
        .unwrap_or(DEFAULT_NEXT_STEP)
        .to_string()
}
