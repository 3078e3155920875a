pub mod config;
pub mod data;
pub mod deck;
pub mod gesture;
pub mod notify;

use config::load_config;
use data::{avatar_options, load_profiles, Avatar, Card};
use deck::{CardPhase, DeckController, ExitingCard, SkillPrompt};
use gesture::{classify_release, Direction, Offset};
use log::{error, info};
use notify::{Notification, NotificationSink, ToastQueue};
use std::ops::Deref;
use wasm_bindgen::prelude::wasm_bindgen;
use wasm_bindgen::JsCast;
use web_sys::window;
use yew::prelude::*;

const SPRING_EASING: &str = "cubic-bezier(0.175, 0.885, 0.32, 1.275)";

#[derive(Clone, Copy, PartialEq)]
enum View {
    Deck,
    Partners,
}

#[function_component(App)]
fn app() -> Html {
    let config = use_memo(|_| load_config(), ());
    let controller = {
        let config = config.clone();
        use_state(move || {
            let cards = match load_profiles() {
                Ok(cards) => cards,
                Err(err) => {
                    error!("Starting with an empty deck: {}", err);
                    Vec::new()
                }
            };
            DeckController::new(cards, &config)
        })
    };
    let toasts = use_state(ToastQueue::default);
    let avatar = use_state(|| None::<Avatar>);
    let view = use_state(|| View::Deck);

    {
        let threshold = config.distance_threshold;
        use_effect_with_deps(
            move |offset: &Option<Offset>| {
                let background =
                    offset.and_then(|offset| body_background_for_offset(offset, threshold));
                if let Some(window) = window() {
                    if let Some(document) = window.document() {
                        if let Some(body) = document.body() {
                            let style = body.style();
                            let _ = style.set_property("transition", "background 0.25s ease");
                            match background {
                                Some(gradient) => {
                                    let _ = style.set_property("background", &gradient);
                                    let _ = style.set_property("background-image", &gradient);
                                }
                                None => {
                                    let _ = style.remove_property("background");
                                    let _ = style.remove_property("background-image");
                                }
                            }
                        }
                    }
                }
                || ()
            },
            controller.drag_offset(),
        );
    }

    let on_select_avatar = {
        let avatar = avatar.clone();
        Callback::from(move |selected: Avatar| {
            info!("Mood avatar selected: {}", selected.id);
            avatar.set(Some(selected));
        })
    };

    let on_prompt_choice = {
        let controller = controller.clone();
        let toasts = toasts.clone();
        Callback::from(move |choice: Option<usize>| {
            let mut next = (*controller).clone();
            let mut queue = (*toasts).clone();
            next.resolve_prompt(choice, &mut queue);
            controller.set(next);
            toasts.set(queue);
        })
    };

    let on_toast_done = {
        let toasts = toasts.clone();
        Callback::from(move |id: u64| {
            let mut queue = (*toasts).clone();
            if queue.dismiss(id) {
                toasts.set(queue);
            }
        })
    };

    let on_chat = {
        let toasts = toasts.clone();
        Callback::from(move |name: String| {
            let mut queue = (*toasts).clone();
            queue.notify(Notification::success(format!("Opening chat with {}...", name)));
            toasts.set(queue);
        })
    };

    let show_partners = {
        let view = view.clone();
        Callback::from(move |_: MouseEvent| view.set(View::Partners))
    };

    let show_deck = {
        let view = view.clone();
        Callback::from(move |_: MouseEvent| view.set(View::Deck))
    };

    let toast_markup = render_toasts(&toasts, config.toast_duration_ms, &on_toast_done);

    let Some(selected_avatar) = (*avatar).clone() else {
        return html! {
            <div class="app-container">
                { toast_markup }
                { render_avatar_selection(&avatar_options(), &on_select_avatar) }
            </div>
        };
    };

    let content = match *view {
        View::Deck => html! {
            <>
                <div class="deck-stage">
                    { render_deck_area(&controller, &toasts) }
                    {
                        match controller.prompt() {
                            Some(prompt) => render_skill_prompt(prompt, &on_prompt_choice),
                            None => html! {},
                        }
                    }
                </div>
                <button class="partners-button" onclick={show_partners}>
                    { format!("Possible Partners ({})", controller.saved().len()) }
                </button>
            </>
        },
        View::Partners => render_partners(controller.saved(), show_deck, &on_chat),
    };

    html! {
        <div class="app-container">
            { toast_markup }
            <div class="avatar-badge">
                <span class="avatar-glyph">{ selected_avatar.glyph }</span>
                <span class="avatar-name">{ &selected_avatar.name }</span>
            </div>
            <main class="content">
                { content }
            </main>
        </div>
    }
}

fn render_avatar_selection(options: &[Avatar], on_select: &Callback<Avatar>) -> Html {
    html! {
        <div class="avatar-selection">
            <div class="avatar-panel">
                <h1>{ "Choose Your Mood Avatar" }</h1>
                <div class="avatar-grid">
                    { for options.iter().map(|avatar| {
                        let onclick = {
                            let on_select = on_select.clone();
                            let avatar = avatar.clone();
                            Callback::from(move |_: MouseEvent| on_select.emit(avatar.clone()))
                        };
                        html! {
                            <button key={avatar.id.clone()}
                                class="avatar-option"
                                aria-label={format!("Select {} avatar", avatar.name)}
                                onclick={onclick}>
                                <span class="avatar-glyph">{ avatar.glyph }</span>
                                <span class="avatar-name">{ &avatar.name }</span>
                            </button>
                        }
                    }) }
                </div>
            </div>
        </div>
    }
}

fn render_card_body(card: &Card) -> Html {
    html! {
        <>
            <p class="card-title">{ &card.name }</p>
            <span class="card-category">{ card.category.badge() }</span>
            <div class="card-skills">
                <h3>{ "Skills" }</h3>
                <div class="skill-tags">
                    { for card.skills.iter().map(|skill| html! {
                        <span key={skill.clone()} class="skill-tag">{ skill }</span>
                    }) }
                </div>
            </div>
            <div class="card-description">
                <h3>{ "Work Style" }</h3>
                <p>{ &card.description }</p>
            </div>
        </>
    }
}

fn render_deck_area(
    controller: &UseStateHandle<DeckController>,
    toasts: &UseStateHandle<ToastQueue>,
) -> Html {
    let state = controller.deref();
    let visible: Vec<&Card> = state.visible().collect();

    let placeholder = if state.is_exhausted() {
        html! {
            <div class="card placeholder">
                <p class="card-title">{ "No More Cards" }</p>
                <p>{ "Come back tomorrow for fresh matches!" }</p>
            </div>
        }
    } else {
        html! {}
    };

    let exiting = match state.exiting() {
        Some(exiting) => render_exiting_card(exiting, state.config().exit_duration_ms, controller),
        None => html! {},
    };

    html! {
        <div class="card-stack">
            { placeholder }
            { for visible.iter().enumerate().rev().map(|(index, card)| {
                if index == 0 {
                    render_active_card(card, controller, toasts)
                } else {
                    html! {
                        <div key={card.id.clone()} class="card inactive">
                            { render_card_body(card) }
                        </div>
                    }
                }
            }) }
            { exiting }
        </div>
    }
}

fn render_active_card(
    card: &Card,
    controller: &UseStateHandle<DeckController>,
    toasts: &UseStateHandle<ToastQueue>,
) -> Html {
    let state = controller.deref();
    let config = state.config();
    let is_dragging = state.phase_of(&card.id) == Some(CardPhase::Dragging);
    let transform = state.active_transform();
    let transform_style = format!(
        "transform: {}; transition: {};",
        transform.css_transform(),
        if is_dragging {
            "transform 0s".to_string()
        } else {
            format!("transform {}ms {}", config.spring_back_ms, SPRING_EASING)
        }
    );

    let hint = state
        .drag_offset()
        .and_then(|offset| classify_release(offset, None, config))
        .map(|direction| {
            html! {
                <span class={classes!("swipe-hint", direction.as_str())}>
                    { direction_hint(direction) }
                </span>
            }
        })
        .unwrap_or_else(|| html! {});

    let pointer_down = {
        let controller = controller.clone();
        let card_id = card.id.clone();
        Callback::from(move |event: web_sys::PointerEvent| {
            event.prevent_default();
            let mut next = (*controller).clone();
            if !next.pointer_down(
                &card_id,
                event.pointer_id(),
                event.client_x() as f64,
                event.client_y() as f64,
                event.time_stamp(),
            ) {
                return;
            }
            if let Some(target) = event
                .target()
                .and_then(|t| t.dyn_into::<web_sys::Element>().ok())
            {
                let _ = target.set_pointer_capture(event.pointer_id());
            }
            controller.set(next);
        })
    };

    let pointer_move = {
        let controller = controller.clone();
        Callback::from(move |event: web_sys::PointerEvent| {
            let mut next = (*controller).clone();
            if next
                .pointer_move(
                    event.pointer_id(),
                    event.client_x() as f64,
                    event.client_y() as f64,
                    event.time_stamp(),
                )
                .is_some()
            {
                event.prevent_default();
                controller.set(next);
            }
        })
    };

    let pointer_end = {
        let controller = controller.clone();
        let toasts = toasts.clone();
        Callback::from(move |event: web_sys::PointerEvent| {
            let mut next = (*controller).clone();
            let mut queue = (*toasts).clone();
            let released = next.pointer_up(
                event.pointer_id(),
                event.client_x() as f64,
                event.client_y() as f64,
                event.time_stamp(),
                &mut queue,
            );
            if released.is_some() {
                release_capture(&event);
                controller.set(next);
                if queue != *toasts {
                    toasts.set(queue);
                }
            }
        })
    };

    let pointer_cancel = {
        let controller = controller.clone();
        Callback::from(move |event: web_sys::PointerEvent| {
            let mut next = (*controller).clone();
            if next.pointer_cancel(event.pointer_id()) {
                release_capture(&event);
                controller.set(next);
            }
        })
    };

    html! {
        <div key={card.id.clone()}
            class={classes!("card", "active", is_dragging.then_some("dragging"))}
            style={transform_style}
            onpointerdown={pointer_down}
            onpointermove={pointer_move}
            onpointerup={pointer_end}
            onpointercancel={pointer_cancel}>
            { hint }
            { render_card_body(card) }
        </div>
    }
}

fn render_exiting_card(
    exiting: &ExitingCard,
    duration_ms: u32,
    controller: &UseStateHandle<DeckController>,
) -> Html {
    let style = format!(
        "--exit-from: {}; --exit-to: {}; animation-duration: {}ms;",
        exiting.from.css_transform(),
        exiting.to.css_transform(),
        duration_ms
    );

    let on_done = {
        let controller = controller.clone();
        let card_id = exiting.card.id.clone();
        Callback::from(move |_: web_sys::AnimationEvent| {
            let mut next = (*controller).clone();
            if next.finish_exit(&card_id) {
                controller.set(next);
            }
        })
    };

    html! {
        <div key={format!("exit-{}", exiting.card.id)}
            class={classes!("card", "exiting", exiting.direction.as_str())}
            style={style}
            onanimationend={on_done}>
            { render_card_body(&exiting.card) }
        </div>
    }
}

fn render_skill_prompt(prompt: &SkillPrompt, on_choice: &Callback<Option<usize>>) -> Html {
    let skip = {
        let on_choice = on_choice.clone();
        Callback::from(move |_: MouseEvent| on_choice.emit(None))
    };

    html! {
        <div class="prompt-overlay">
            <div class="prompt-panel">
                <h3>{ "Still searching?" }</h3>
                <p>{ "Which skill matters most right now?" }</p>
                <div class="prompt-choices">
                    { for prompt.choices.iter().enumerate().map(|(index, skill)| {
                        let onclick = {
                            let on_choice = on_choice.clone();
                            Callback::from(move |_: MouseEvent| on_choice.emit(Some(index)))
                        };
                        html! {
                            <button key={skill.clone()} class="prompt-choice" onclick={onclick}>{ skill }</button>
                        }
                    }) }
                    <button class="prompt-skip" onclick={skip}>{ "Skip" }</button>
                </div>
            </div>
        </div>
    }
}

fn render_partners(
    saved: &[Card],
    on_back: Callback<MouseEvent>,
    on_chat: &Callback<String>,
) -> Html {
    let list = if saved.is_empty() {
        html! {
            <div class="partners-empty">
                <p>{ "No partners saved yet." }</p>
                <p class="hint">{ "Swipe right on cards to save potential partners." }</p>
            </div>
        }
    } else {
        html! {
            <div class="partners-list">
                { for saved.iter().map(|partner| {
                    let onclick = {
                        let on_chat = on_chat.clone();
                        let name = partner.name.clone();
                        Callback::from(move |_: MouseEvent| on_chat.emit(name.clone()))
                    };
                    html! {
                        <div key={partner.id.clone()} class="partner-card">
                            <div class="partner-header">
                                <div>
                                    <h3>{ &partner.name }</h3>
                                    <span class="card-category">{ partner.category.badge() }</span>
                                </div>
                                <button class="chat-button" onclick={onclick}>{ "Chat" }</button>
                            </div>
                            <div class="skill-tags">
                                { for partner.skills.iter().map(|skill| html! {
                                    <span key={skill.clone()} class="skill-tag">{ skill }</span>
                                }) }
                            </div>
                            <p class="partner-description">{ &partner.description }</p>
                        </div>
                    }
                }) }
            </div>
        }
    };

    html! {
        <div class="partners-view">
            <div class="partners-header">
                <button class="back-button" onclick={on_back}>{ "‹ Back to Cards" }</button>
                <h1>{ "Possible Partners" }</h1>
            </div>
            { list }
        </div>
    }
}

fn render_toasts(toasts: &ToastQueue, duration_ms: u32, on_done: &Callback<u64>) -> Html {
    html! {
        <div class="toast-region">
            { for toasts.toasts().iter().map(|toast| {
                let id = toast.id;
                let onanimationend = {
                    let on_done = on_done.clone();
                    Callback::from(move |_: web_sys::AnimationEvent| on_done.emit(id))
                };
                html! {
                    <div key={id.to_string()}
                        class={classes!("toast", toast.notification.style.css_class())}
                        style={format!("animation-duration: {}ms;", duration_ms)}
                        onanimationend={onanimationend}>
                        { &toast.notification.message }
                    </div>
                }
            }) }
        </div>
    }
}

fn release_capture(event: &web_sys::PointerEvent) {
    if let Some(target) = event
        .target()
        .and_then(|t| t.dyn_into::<web_sys::Element>().ok())
    {
        let _ = target.release_pointer_capture(event.pointer_id());
    }
}

fn direction_hint(direction: Direction) -> &'static str {
    match direction {
        Direction::Right => "Save",
        Direction::Left => "Pass",
        Direction::Up => "Details",
        Direction::Down => "Similar",
    }
}

#[wasm_bindgen(start)]
pub fn run_app() {
    let level = if cfg!(debug_assertions) {
        log::Level::Debug
    } else {
        log::Level::Info
    };
    wasm_logger::init(wasm_logger::Config::new(level));
    yew::Renderer::<App>::new().render();
}

/// Page tint while dragging: green for save, red for pass, blue for
/// details, purple for similar. Strength ramps up to the distance threshold.
fn body_background_for_offset(offset: Offset, threshold: f64) -> Option<String> {
    let horizontal = offset.dx.abs() > offset.dy.abs();
    let (magnitude, start_rgb, end_rgb) = match (horizontal, offset.dx, offset.dy) {
        (true, dx, _) if dx > 0.0 => (dx, "34, 197, 94", "6, 78, 59"),
        (true, dx, _) => (-dx, "239, 68, 68", "112, 8, 18"),
        (false, _, dy) if dy < 0.0 => (-dy, "59, 130, 246", "4, 21, 64"),
        (false, _, dy) => (dy, "168, 85, 247", "59, 7, 100"),
    };

    let normalized = (magnitude / threshold.max(1.0)).clamp(0.0, 1.0);
    if !normalized.is_finite() || normalized < 0.01 {
        return None;
    }

    let start_alpha = 0.18 * normalized;
    let end_alpha = 0.38 * normalized + 0.02;
    Some(format!(
        "radial-gradient(circle at top, rgba({}, {:.3}), rgba({}, {:.3}))",
        start_rgb, start_alpha, end_rgb, end_alpha
    ))
}
