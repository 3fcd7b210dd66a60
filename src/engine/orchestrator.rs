//! Reply orchestration: context assembly, generation, reply caching
//! and the failure path.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use usher_core::business::Business;
use usher_core::context::GenerationContext;
use usher_core::event::Role;
use usher_core::prompt;
use usher_core::sanitize::has_unresolved_placeholders;

use crate::i18n::{self, Lang};

use super::Engine;

/// Produce and send one reply to free-form text.
///
/// `business` is `None` in general chat, which generates with an empty
/// system context. On success the reply is cached against (user, text)
/// and both turns land in the session history. On failure the user gets
/// a short apology, only their own turn is recorded, and nothing is
/// cached. An unresolved `{placeholder}` in the output counts as
/// failure.
pub(super) async fn respond(
    engine: &Arc<Engine>,
    user_id: &str,
    business: Option<&Business>,
    text: &str,
    lang: Lang,
) {
    // Identical text inside the reply window means a provider retry,
    // not a new question. Resend what we already said.
    if let Some(cached) = engine.dedup.cached_reply(user_id, text).await {
        debug!(user = %user_id, "serving cached reply");
        engine.send(user_id, &cached).await;
        return;
    }

    let system = match business {
        Some(b) => prompt::system_context(b),
        None => String::new(),
    };
    let history = engine.store.history(user_id).await;
    let context = GenerationContext::new(text)
        .with_system(system)
        .with_history(history);

    match engine.generator.generate(&context, user_id).await {
        Ok(reply) if !has_unresolved_placeholders(&reply) => {
            engine.dedup.cache_reply(user_id, text, &reply).await;
            engine.store.append_message(user_id, Role::User, text).await;
            engine
                .store
                .append_message(user_id, Role::Assistant, &reply)
                .await;
            engine.send(user_id, &reply).await;
        }
        Ok(reply) => {
            warn!(user = %user_id, reply = %reply, "generated reply leaked placeholders");
            apologize(engine, user_id, text, lang).await;
        }
        Err(err) => {
            warn!(user = %user_id, error = %err, "generation failed");
            apologize(engine, user_id, text, lang).await;
        }
    }
}

/// Failure path: record the user's turn so the next attempt has it in
/// history, then apologize. Nothing is cached.
async fn apologize(engine: &Arc<Engine>, user_id: &str, text: &str, lang: Lang) {
    engine.store.append_message(user_id, Role::User, text).await;
    engine.send(user_id, i18n::t("apology", lang)).await;
}

/// Schedule the short business introduction that follows a welcome.
///
/// Fires after a small delay, and only if the user is still bound to
/// the same business by then. A failed or placeholder-ridden intro is
/// dropped silently; the welcome line already went out.
pub(super) fn spawn_intro(engine: &Arc<Engine>, user_id: &str, business: &Business, lang: Lang) {
    if !engine.generator.is_configured() {
        return;
    }

    let engine = engine.clone();
    let user_id = user_id.to_string();
    let business = business.clone();
    let delay = Duration::from_secs(engine.cfg.engine.intro_delay_secs);

    tokio::spawn(async move {
        tokio::time::sleep(delay).await;

        let still_bound = matches!(
            engine.store.get(&user_id).await,
            Some(session) if session.business_id == business.id
        );
        if !still_bound {
            debug!(user = %user_id, business = %business.id, "user moved on, skipping intro");
            return;
        }

        let context = GenerationContext::new(intro_instruction(lang))
            .with_system(prompt::system_context(&business));

        match engine.generator.generate(&context, &user_id).await {
            Ok(intro) if !has_unresolved_placeholders(&intro) => {
                engine
                    .store
                    .append_message(&user_id, Role::Assistant, &intro)
                    .await;
                engine.send(&user_id, &intro).await;
            }
            Ok(intro) => {
                warn!(user = %user_id, intro = %intro, "intro leaked placeholders, suppressing");
            }
            Err(err) => {
                debug!(user = %user_id, error = %err, "intro generation failed, staying quiet");
            }
        }
    });
}

fn intro_instruction(lang: Lang) -> &'static str {
    match lang {
        Lang::He => {
            "הצג את העסק ללקוח בשניים-שלושה משפטים קצרים וידידותיים, והצע עזרה."
        }
        Lang::En => {
            "Introduce the business to the customer in two or three short, friendly sentences and offer to help. Respond in English."
        }
    }
}
