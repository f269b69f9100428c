//! Premium reply prompts

use sales_assist_core::{Intent, ReplyPrompt, ReplyRequest, SalesStage};

use crate::explain::intent_rationale;

const PERSONA: &str = "Eres un asesor comercial de una academia online. \
Respondes en español, en dos o tres frases, con tono cercano y sin presionar.";

const EARLY_STAGE_RULES: &str = "Reglas: no menciones precios, montos, descuentos, \
enlaces de pago, llamadas, reuniones ni demos. Termina ofreciendo elegir entre la ruta \
rápida o el plan completo.";

const LATE_STAGE_RULES: &str =
    "Reglas: puedes hablar de inversión y próximos pasos si el cliente lo pide.";

/// Build the system/user prompt pair for a premium reply
pub fn build_reply_prompt(
    request: &ReplyRequest,
    intent: Intent,
    stage: SalesStage,
    default_name: &str,
) -> ReplyPrompt {
    let name = request.name().unwrap_or(default_name);
    let rules = if stage.is_early() {
        EARLY_STAGE_RULES
    } else {
        LATE_STAGE_RULES
    };

    let system = format!(
        "{persona}\n\nEtapa actual: {stage}. {guidance}\nLectura del mensaje: {rationale}\n{rules}\nDirígete al cliente como {name}.",
        persona = PERSONA,
        stage = stage.display_name(),
        guidance = stage.guidance(),
        rationale = intent_rationale(intent),
        rules = rules,
        name = name,
    );

    let mut user = format!("Mensaje del cliente: {}", request.customer_message.trim());
    if let Some(note) = request
        .context_note
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
    {
        user.push_str(&format!("\nNota del asesor: {}", note));
    }

    ReplyPrompt::new(system, user)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_early_stage_prompt_forbids_pricing() {
        let request = ReplyRequest::new("no tengo tiempo", SalesStage::Discovery).with_name("Ana");
        let prompt = build_reply_prompt(&request, Intent::Time, SalesStage::Discovery, "amigo");

        assert!(prompt.system_prompt.contains("no menciones precios"));
        assert!(prompt.system_prompt.contains("Descubrimiento"));
        assert!(prompt.system_prompt.contains("como Ana."));
        assert_eq!(prompt.user_prompt, "Mensaje del cliente: no tengo tiempo");
    }

    #[test]
    fn test_late_stage_prompt_with_note() {
        let request = ReplyRequest::new("¿cómo pago?", SalesStage::Close)
            .with_context_note("quiere pagar en cuotas");
        let prompt = build_reply_prompt(&request, Intent::Price, SalesStage::Close, "amigo");

        assert!(prompt.system_prompt.contains("inversión"));
        assert!(prompt.system_prompt.contains("como amigo."));
        assert!(prompt.user_prompt.ends_with("Nota del asesor: quiere pagar en cuotas"));
    }
}
