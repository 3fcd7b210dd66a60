//! Per-event processing: the path from a classified webhook event to
//! outbound sends and session mutations.
//!
//! State movement is decided by `selection::transition`; this module
//! only gathers its inputs and executes its decisions.

use std::sync::Arc;

use tracing::{debug, info, warn};

use usher_core::business::Business;
use usher_core::event::{Button, InteractiveResponse, TextMessage, WebhookEvent, MAX_BUTTONS};
use usher_core::sanitize::normalize_text;
use usher_sessions::GENERAL_CHAT_ID;

use crate::i18n::{self, Lang};

use super::keywords::{self, Command};
use super::orchestrator;
use super::selection::{self, SelectionInput, SelectionState, Step, BUSINESS_BUTTON_PREFIX};
use super::Engine;

/// Handle one classified event end to end.
pub(crate) async fn handle_event(engine: &Arc<Engine>, event: WebhookEvent) {
    match event {
        WebhookEvent::StatusUpdate { status } => {
            debug!(status = %status, "delivery status update, nothing to do");
        }
        WebhookEvent::Interactive(response) => handle_interactive(engine, response).await,
        WebhookEvent::Text(message) => handle_text(engine, message).await,
    }
}

/// Button and list replies. A selection id binds directly, from any
/// state; anything else is logged and dropped.
async fn handle_interactive(engine: &Arc<Engine>, response: InteractiveResponse) {
    let lang = i18n::detect(&response.title);
    let session = engine.store.get(&response.from).await;
    let state = selection::state_of(session.as_ref());

    let step = selection::transition(
        &state,
        SelectionInput::Button(&response.id),
        &[],
        engine.cfg.engine.page_size,
    );
    if step == Step::Drop {
        debug!(
            user = %response.from,
            id = %response.id,
            kind = ?response.kind,
            "interactive reply with unknown id, dropping"
        );
        return;
    }
    drive(engine, &response.from, &state, step, &[], "", lang).await;
}

async fn handle_text(engine: &Arc<Engine>, message: TextMessage) {
    // The transport may deliver the same message twice; the first
    // delivery wins.
    if engine.dedup.has_seen(&message.id).await {
        debug!(user = %message.from, id = %message.id, "duplicate message id, skipping");
        return;
    }
    engine.dedup.mark_seen(&message.id).await;

    if message.body_missing {
        warn!(user = %message.from, id = %message.id, "text message without body");
    }

    let text = message.body.trim();
    let normalized = normalize_text(text);
    let lang = i18n::detect(text);
    let user_id = message.from.as_str();

    let session = engine.store.get(user_id).await;
    let state = selection::state_of(session.as_ref());

    // Commands that never move the machine are answered in place;
    // everything else becomes machine input.
    let input = match keywords::parse(&normalized) {
        Some(Command::Help) => {
            engine.send(user_id, i18n::t("help", lang)).await;
            return;
        }
        Some(Command::Debug) => {
            send_debug_dump(engine, user_id, &state, lang).await;
            return;
        }
        Some(Command::GeneralChat) => SelectionInput::GeneralChat,
        Some(Command::Switch(index)) => SelectionInput::Switch(index),
        Some(Command::NextPage) => SelectionInput::Next,
        Some(Command::PrevPage) => SelectionInput::Previous,
        None => SelectionInput::Text(&normalized),
    };

    let wants_listing = selection::needs_listing(&state, &input);
    let businesses = if wants_listing {
        match engine.directory.list().await {
            Ok(businesses) => businesses,
            Err(err) => {
                warn!(user = %user_id, error = %err, "directory list failed");
                engine.send(user_id, i18n::t("apology", lang)).await;
                return;
            }
        }
    } else {
        Vec::new()
    };
    if wants_listing && businesses.is_empty() {
        engine.send(user_id, i18n::t("no_businesses", lang)).await;
        return;
    }

    let step = selection::transition(&state, input, &businesses, engine.cfg.engine.page_size);
    drive(engine, user_id, &state, step, &businesses, text, lang).await;
}

/// Execute one machine decision.
async fn drive(
    engine: &Arc<Engine>,
    user_id: &str,
    state: &SelectionState,
    step: Step<'_>,
    businesses: &[Business],
    text: &str,
    lang: Lang,
) {
    match step {
        Step::Bind(business) => bind_and_welcome(engine, user_id, business, lang).await,
        Step::BindId(business_id) => match engine.directory.get_by_id(&business_id).await {
            Ok(Some(business)) => bind_and_welcome(engine, user_id, &business, lang).await,
            Ok(None) => {
                warn!(user = %user_id, business = %business_id, "selection of unknown business");
                engine.send(user_id, i18n::t("invalid_choice", lang)).await;
            }
            Err(err) => {
                warn!(user = %user_id, error = %err, "directory lookup failed");
                engine.send(user_id, i18n::t("apology", lang)).await;
            }
        },
        Step::BindGeneralChat => {
            let rebound = engine.store.bind(user_id, GENERAL_CHAT_ID, "").await;
            if rebound {
                engine.dedup.purge_user(user_id).await;
            }
            info!(user = %user_id, "entered general chat");
            engine.send(user_id, i18n::t("general_chat", lang)).await;
        }
        Step::ShowPage(page) => render_page(engine, user_id, businesses, page, lang).await,
        Step::Invalid(page) => {
            engine.send(user_id, i18n::t("invalid_choice", lang)).await;
            render_page(engine, user_id, businesses, page, lang).await;
        }
        Step::Converse => converse(engine, user_id, state, text, lang).await,
        // Unknown button ids are dropped by the caller.
        Step::Drop => {}
    }
}

/// Ordinary conversation: everything the machine did not claim.
async fn converse(
    engine: &Arc<Engine>,
    user_id: &str,
    state: &SelectionState,
    text: &str,
    lang: Lang,
) {
    match state {
        SelectionState::Bound { business_id } => {
            if text.is_empty() {
                debug!(user = %user_id, "empty text while bound, nothing to answer");
                return;
            }
            match engine.directory.get_by_id(business_id).await {
                Ok(Some(business)) => {
                    orchestrator::respond(engine, user_id, Some(&business), text, lang).await;
                }
                Ok(None) => {
                    // The bound business disappeared from the directory.
                    // Re-open the list so the user can pick again.
                    warn!(user = %user_id, business = %business_id, "bound business no longer listed");
                    reopen_list(engine, user_id, lang).await;
                }
                Err(err) => {
                    warn!(user = %user_id, error = %err, "directory lookup failed");
                    engine.send(user_id, i18n::t("apology", lang)).await;
                }
            }
        }
        SelectionState::GeneralChat => {
            if text.is_empty() {
                debug!(user = %user_id, "empty text in general chat, nothing to answer");
                return;
            }
            orchestrator::respond(engine, user_id, None, text, lang).await;
        }
        // The machine never hands these states conversation text.
        SelectionState::Unbound | SelectionState::Browsing { .. } => {}
    }
}

/// The debug command: a structured dump of the bound business record;
/// declines when nothing is bound.
async fn send_debug_dump(engine: &Arc<Engine>, user_id: &str, state: &SelectionState, lang: Lang) {
    let SelectionState::Bound { business_id } = state else {
        engine.send(user_id, i18n::t("debug_unbound", lang)).await;
        return;
    };
    match engine.directory.get_by_id(business_id).await {
        Ok(Some(business)) => {
            engine.send(user_id, &i18n::debug_dump(&business)).await;
        }
        Ok(None) | Err(_) => {
            engine.send(user_id, i18n::t("apology", lang)).await;
        }
    }
}

/// Fetch the listing and show its first page again after a binding
/// went stale.
async fn reopen_list(engine: &Arc<Engine>, user_id: &str, lang: Lang) {
    let businesses = match engine.directory.list().await {
        Ok(businesses) => businesses,
        Err(err) => {
            warn!(user = %user_id, error = %err, "directory list failed");
            engine.send(user_id, i18n::t("apology", lang)).await;
            return;
        }
    };
    if businesses.is_empty() {
        engine.send(user_id, i18n::t("no_businesses", lang)).await;
        return;
    }
    render_page(engine, user_id, &businesses, 0, lang).await;
}

/// Bind, welcome, and schedule the delayed introduction. Rebinding to
/// a different business also purges that user's cached replies so
/// nothing from the previous business can be replayed.
pub(super) async fn bind_and_welcome(
    engine: &Arc<Engine>,
    user_id: &str,
    business: &Business,
    lang: Lang,
) {
    let rebound = engine.store.bind(user_id, &business.id, &business.phone).await;
    if rebound {
        engine.dedup.purge_user(user_id).await;
    }
    info!(user = %user_id, business = %business.id, "business bound");

    engine.send(user_id, &i18n::welcome(lang, business)).await;
    orchestrator::spawn_intro(engine, user_id, business, lang);
}

/// Send one page of the list and record the browsing position. Small
/// directories go out as tappable buttons; larger ones as numbered
/// text.
async fn render_page(
    engine: &Arc<Engine>,
    user_id: &str,
    businesses: &[Business],
    page: usize,
    lang: Lang,
) {
    let page_size = engine.cfg.engine.page_size;
    let pages = selection::total_pages(businesses.len(), page_size);
    let page = page.min(pages.saturating_sub(1));
    let entries = selection::page_slice(businesses, page, page_size);
    let text = i18n::business_page(lang, entries, page, pages, page * page_size + 1);

    if businesses.len() <= MAX_BUTTONS {
        let buttons: Vec<Button> = entries
            .iter()
            .map(|b| Button::new(format!("{BUSINESS_BUTTON_PREFIX}{}", b.id), b.name.as_str()))
            .collect();
        engine.send_interactive(user_id, &text, &buttons).await;
    } else {
        engine.send(user_id, &text).await;
    }

    engine
        .store
        .set_navigation(user_id, page, page_size, businesses.len())
        .await;
}
