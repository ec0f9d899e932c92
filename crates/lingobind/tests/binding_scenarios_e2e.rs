#![forbid(unsafe_code)]

//! End-to-end scenarios for translation placeholders.
//!
//! Organized into modules:
//! 1. `immediate` - first render and refresh on locale change
//! 2. `no_change` - redundant updates are suppressed
//! 3. `lifecycle` - disconnect, identity, registry consistency
//! 4. `deferred` - readiness-gated placeholders
//! 5. `wiring` - lazy one-time engine subscription
//! 6. `reentry` - events fired from inside a sweep

use std::rc::Rc;

use lingobind::{
    Binding, Bindings, BindingsConfig, EngineEvent, Options, OptionsSource, Readiness,
    ReadinessError, SweepReentry, TranslationEngine, translate, translate_when,
};
use lingobind_harness::{RecordingSite, ScriptedEngine, capture_events};
use serde_json::json;

fn greeting_engine() -> Rc<ScriptedEngine> {
    Rc::new(
        ScriptedEngine::new("en")
            .with_resource("en", "greeting", "Hello, {{name}}!")
            .with_resource("es", "greeting", "Hola, {{name}}!")
            .with_resource("en", "title", "Inbox")
            .with_resource("es", "title", "Inbox"),
    )
}

fn service(engine: &Rc<ScriptedEngine>) -> Bindings {
    Bindings::new(Rc::clone(engine) as Rc<dyn TranslationEngine>)
}

// =========================================================================
// 1. Immediate placeholders
// =========================================================================

mod immediate {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn renders_then_follows_language_change() {
        let engine = greeting_engine();
        let bindings = service(&engine);
        let site = RecordingSite::new();

        let (placeholder, first) = bindings.mount(
            translate("greeting").with_options(json!({ "name": "Ana" })),
            site.clone(),
        );
        site.apply(&first);
        assert_eq!(site.displayed().as_deref(), Some("Hello, Ana!"));

        engine.change_language("es");
        assert_eq!(engine.language(), "es");
        assert_eq!(site.displayed().as_deref(), Some("Hola, Ana!"));
        assert_eq!(site.commits(), vec!["Hola, Ana!".to_string()]);
        assert_eq!(placeholder.value(), "Hola, Ana!");
    }

    #[test]
    fn resource_added_later_fills_in_missing_translation() {
        let engine = Rc::new(ScriptedEngine::new("en"));
        let bindings = service(&engine);
        let site = RecordingSite::new();

        let (_placeholder, first) = bindings.mount(translate("late.key"), site.clone());
        assert!(first.is_no_change());
        assert_eq!(site.displayed(), None);

        engine.add_resource("en", "late.key", "Finally here");
        assert_eq!(site.displayed().as_deref(), Some("Finally here"));
    }

    #[test]
    fn supplier_options_are_captured_per_render() {
        let engine = greeting_engine();
        let bindings = service(&engine);
        let site = RecordingSite::new();
        let name = Rc::new(std::cell::RefCell::new("Ana".to_string()));

        let name_clone = Rc::clone(&name);
        let supplier = OptionsSource::supplier(move || {
            let mut options = Options::new();
            options.insert("name".into(), json!(name_clone.borrow().clone()));
            options
        });
        let placeholder = bindings.translate(site.clone());
        site.apply(&placeholder.render("greeting", supplier));

        *name.borrow_mut() = "Bo".to_string();
        engine.change_language("es");
        assert_eq!(
            site.displayed().as_deref(),
            Some("Hola, Ana!"),
            "sweep uses options normalized at the last render"
        );
    }

    #[test]
    fn rerender_with_new_options_updates_registry_entry() {
        let engine = greeting_engine();
        let bindings = service(&engine);
        let site = RecordingSite::new();

        let (placeholder, first) = bindings.mount(
            translate("greeting").with_options(json!({ "name": "Ana" })),
            site.clone(),
        );
        site.apply(&first);
        let second = placeholder
            .update(translate("greeting").with_options(json!({ "name": "Bo" })))
            .expect("same variant");
        site.apply(&second);

        engine.change_language("es");
        assert_eq!(site.displayed().as_deref(), Some("Hola, Bo!"));
    }
}

// =========================================================================
// 2. No-change suppression
// =========================================================================

mod no_change {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn identical_resolution_does_not_invoke_update_hook() {
        let engine = greeting_engine();
        let bindings = service(&engine);
        let site = RecordingSite::new();

        let (_placeholder, first) = bindings.mount(translate("title"), site.clone());
        site.apply(&first);

        engine.change_language("es");
        assert_eq!(site.commit_count(), 0);
        let report = bindings.last_sweep().expect("sweep ran");
        assert_eq!((report.visited, report.updated, report.unchanged), (1, 0, 1));
    }

    #[test]
    fn untranslatable_after_change_keeps_previous_text() {
        let engine = greeting_engine();
        let bindings = service(&engine);
        let site = RecordingSite::new();

        let (placeholder, first) = bindings.mount(
            translate("greeting").with_options(json!({ "name": "Ana" })),
            site.clone(),
        );
        site.apply(&first);

        engine.change_language("de");
        assert_eq!(site.commit_count(), 0);
        assert_eq!(site.displayed().as_deref(), Some("Hello, Ana!"));
        assert_eq!(placeholder.value(), "Hello, Ana!");
    }

    #[test]
    fn repeated_render_with_same_inputs_is_no_change() {
        let engine = greeting_engine();
        let bindings = service(&engine);
        let placeholder = bindings.translate(RecordingSite::new());

        assert!(!placeholder.render("title", OptionsSource::None).is_no_change());
        assert!(placeholder.render("title", OptionsSource::None).is_no_change());
    }
}

// =========================================================================
// 3. Lifecycle
// =========================================================================

mod lifecycle {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn disconnect_removes_exactly_one_entry() {
        let engine = greeting_engine();
        let bindings = service(&engine);
        let first_site = RecordingSite::new();
        let second_site = RecordingSite::new();

        let (first, r1) = bindings.mount(translate("greeting"), first_site.clone());
        let (second, r2) = bindings.mount(translate("greeting"), second_site.clone());
        first_site.apply(&r1);
        second_site.apply(&r2);
        assert_ne!(first.id(), second.id());
        assert_eq!(bindings.live_count(), 2);

        first.on_disconnect();
        assert!(!bindings.is_registered(first.id()));
        assert!(bindings.is_registered(second.id()));

        engine.change_language("es");
        assert_eq!(first_site.commit_count(), 0);
        assert_eq!(second_site.commit_count(), 1);
    }

    #[test]
    fn sweep_never_resolves_disconnected_entries() {
        let engine = greeting_engine();
        let bindings = service(&engine);
        let (kept, _) = bindings.mount(translate("title"), RecordingSite::new());
        let (gone, _) = bindings.mount(translate("greeting"), RecordingSite::new());
        gone.on_disconnect();
        assert_eq!(engine.resolution_count(), 2);

        engine.change_language("es");
        assert_eq!(engine.resolution_count(), 3, "only the connected entry resolves");
        let report = bindings.last_sweep().expect("sweep ran");
        assert_eq!(report.visited, 1);
        assert!(bindings.is_registered(kept.id()));
    }

    #[test]
    fn double_disconnect_is_a_no_op() {
        let engine = greeting_engine();
        let bindings = service(&engine);
        let (placeholder, _) = bindings.mount(translate("title"), RecordingSite::new());
        let (_other, _) = bindings.mount(translate("title"), RecordingSite::new());

        placeholder.on_disconnect();
        assert_eq!(bindings.live_count(), 1);
        placeholder.on_disconnect();
        assert_eq!(bindings.live_count(), 1);
        assert!(!placeholder.is_connected());
    }

    #[test]
    fn dropping_the_placeholder_unregisters() {
        let engine = greeting_engine();
        let bindings = service(&engine);
        let (placeholder, _) = bindings.mount(translate("title"), RecordingSite::new());
        assert_eq!(bindings.live_count(), 1);
        drop(placeholder);
        assert_eq!(bindings.live_count(), 0);
    }

    #[test]
    fn registry_entry_mirrors_latest_evaluation() {
        let engine = greeting_engine();
        let bindings = service(&engine);
        let (placeholder, _) = bindings.mount(
            translate(["missing", "greeting"]).with_options(json!({ "name": "Ana" })),
            RecordingSite::new(),
        );

        let entry = bindings.entry(placeholder.id()).expect("registered");
        assert_eq!(
            entry.keys.iter().collect::<Vec<_>>(),
            vec!["missing", "greeting"]
        );
        assert_eq!(entry.options.get("name"), Some(&json!("Ana")));
    }
}

// =========================================================================
// 4. Deferred placeholders
// =========================================================================

mod deferred {
    use super::*;
    use pretty_assertions::assert_eq;

    fn loading_engine() -> Rc<ScriptedEngine> {
        Rc::new(ScriptedEngine::new("en").with_resource("en", "loading.msg", "Loading..."))
    }

    #[test]
    fn pending_yields_no_change_then_updates_once() {
        let engine = loading_engine();
        let bindings = service(&engine);
        let site = RecordingSite::new();
        let (readiness, settler) = Readiness::pending();

        let (placeholder, first) =
            bindings.mount(translate_when(&readiness, "loading.msg"), site.clone());
        assert!(first.is_no_change());
        site.apply(&first);
        assert_eq!(site.displayed(), None);

        settler.resolve().expect("first settle");
        assert_eq!(site.commits(), vec!["Loading...".to_string()]);
        assert!(bindings.is_registered(placeholder.id()));
    }

    #[test]
    fn rejection_records_diagnostic_and_never_updates() {
        let engine = loading_engine();
        let bindings = service(&engine);
        let site = RecordingSite::new();
        let (readiness, settler) = Readiness::pending();
        let (placeholder, _) =
            bindings.mount(translate_when(&readiness, "loading.msg"), site.clone());

        let ((), capture) = capture_events(|| {
            settler
                .reject(ReadinessError::new("bundle fetch failed"))
                .expect("first settle");
        });

        assert_eq!(site.commit_count(), 0);
        assert!(!bindings.is_registered(placeholder.id()));
        let diagnostics = capture.diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].level, tracing::Level::ERROR);
        assert_eq!(diagnostics[0].field("keys"), Some("loading.msg"));
        assert!(
            diagnostics[0]
                .field("error")
                .is_some_and(|e| e.contains("bundle fetch failed"))
        );
    }

    #[test]
    fn resolved_deferred_placeholder_joins_sweeps() {
        let engine = loading_engine();
        let bindings = service(&engine);
        let site = RecordingSite::new();
        let (readiness, settler) = Readiness::pending();
        let (_placeholder, _) =
            bindings.mount(translate_when(&readiness, "loading.msg"), site.clone());
        settler.resolve().expect("first settle");

        engine.add_resource("es", "loading.msg", "Cargando...");
        engine.change_language("es");
        assert_eq!(
            site.commits(),
            vec!["Loading...".to_string(), "Cargando...".to_string()]
        );
    }

    #[test]
    fn shared_readiness_gates_many_sites() {
        let engine = loading_engine();
        let bindings = service(&engine);
        let (readiness, settler) = Readiness::pending();
        let sites: Vec<Rc<RecordingSite>> = (0..3).map(|_| RecordingSite::new()).collect();
        let _mounted: Vec<_> = sites
            .iter()
            .map(|site| bindings.mount(translate_when(&readiness, "loading.msg"), site.clone()))
            .collect();

        assert_eq!(bindings.live_count(), 0);
        settler.resolve().expect("first settle");
        assert_eq!(bindings.live_count(), 3);
        for site in &sites {
            assert_eq!(site.commit_count(), 1);
        }
    }
}

// =========================================================================
// 5. Lazy wiring
// =========================================================================

mod wiring {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn engine_is_wired_on_first_lookup_only() {
        let engine = greeting_engine();
        let bindings = service(&engine);
        assert_eq!(engine.listener_count(EngineEvent::LanguageChanged), 0);

        let (_a, _) = bindings.mount(translate("title"), RecordingSite::new());
        let (_b, _) = bindings.mount(translate("title"), RecordingSite::new());
        assert!(bindings.is_initialized());
        assert_eq!(engine.listener_count(EngineEvent::LanguageChanged), 1);
        assert_eq!(engine.listener_count(EngineEvent::ResourceAdded), 1);
    }

    #[test]
    fn events_before_first_lookup_are_ignored() {
        let engine = greeting_engine();
        let bindings = service(&engine);
        assert_eq!(engine.change_language("es"), 0);
        assert_eq!(bindings.sweep_count(), 0);
    }

    #[test]
    fn config_can_ignore_resource_events() {
        let engine = Rc::new(ScriptedEngine::new("en"));
        let bindings = Bindings::with_config(
            Rc::clone(&engine) as Rc<dyn TranslationEngine>,
            BindingsConfig::default().with_refresh_on_resource_added(false),
        );
        let site = RecordingSite::new();
        let (_placeholder, _) = bindings.mount(translate("late"), site.clone());

        engine.add_resource("en", "late", "Here");
        assert_eq!(site.commit_count(), 0);
        engine.change_language("en");
        assert_eq!(site.commits(), vec!["Here".to_string()]);
    }

    #[test]
    fn sweep_logs_a_summary_event() {
        let engine = greeting_engine();
        let bindings = service(&engine);
        let (_greeting, _) = bindings.mount(
            translate("greeting").with_options(json!({ "name": "Ana" })),
            RecordingSite::new(),
        );
        let (_title, _) = bindings.mount(translate("title"), RecordingSite::new());

        let (_, capture) = capture_events(|| engine.change_language("es"));
        let summary = capture
            .events()
            .into_iter()
            .find(|event| event.message == "refresh sweep complete")
            .expect("summary event");
        assert_eq!(summary.field("event"), Some("language_changed"));
        assert_eq!(summary.field("visited"), Some("2"));
        assert_eq!(summary.field("updated"), Some("1"));
        assert_eq!(summary.field("unchanged"), Some("1"));
        assert!(!summary.is_diagnostic());
    }

    #[test]
    fn reset_isolates_successive_tests() {
        let engine = greeting_engine();
        let bindings = service(&engine);
        let (_placeholder, _) = bindings.mount(translate("title"), RecordingSite::new());

        bindings.reset();
        assert_eq!(bindings.live_count(), 0);
        assert_eq!(engine.listener_count(EngineEvent::LanguageChanged), 0);
        assert!(bindings.last_sweep().is_none());
    }
}

// =========================================================================
// 6. Reentrant sweeps
// =========================================================================

mod reentry {
    use super::*;
    use pretty_assertions::assert_eq;
    use lingobind::site_fn;

    fn nested_event_site(engine: &Rc<ScriptedEngine>) -> Rc<dyn lingobind::BindingSite> {
        let engine = Rc::downgrade(engine);
        let fired = std::cell::Cell::new(false);
        site_fn(move |_| {
            if !fired.replace(true)
                && let Some(engine) = engine.upgrade()
            {
                engine.add_resource("es", "extra", "Extra");
            }
        })
    }

    #[test]
    fn forbidden_reentry_is_reported() {
        let engine = greeting_engine();
        let bindings = Bindings::with_config(
            Rc::clone(&engine) as Rc<dyn TranslationEngine>,
            BindingsConfig::default().with_reentry(SweepReentry::Forbid),
        );
        let (_placeholder, _) = bindings.mount(
            translate("greeting").with_options(json!({ "name": "Ana" })),
            nested_event_site(&engine),
        );

        let (_, capture) = capture_events(|| engine.change_language("es"));
        assert_eq!(bindings.sweep_count(), 1);
        let diagnostics = capture.diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].field("event"), Some("resource_added"));
    }

    #[test]
    fn coalesced_reentry_runs_after_current_sweep() {
        let engine = greeting_engine();
        let bindings = service(&engine);
        let (_placeholder, _) = bindings.mount(
            translate("greeting").with_options(json!({ "name": "Ana" })),
            nested_event_site(&engine),
        );

        engine.change_language("es");
        assert_eq!(bindings.sweep_count(), 2);
        let last = bindings.last_sweep().expect("sweep ran");
        assert_eq!(last.event, EngineEvent::ResourceAdded);
        assert_eq!(last.updated, 0);
    }
}
