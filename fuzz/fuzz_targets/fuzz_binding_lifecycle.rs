#![no_main]

use std::rc::Rc;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use lingobind::{
    Binding, Bindings, BindingsConfig, Placeholder, Readiness, ReadinessError, Settler,
    SweepReentry, TranslationEngine, translate, translate_when,
};
use lingobind_harness::{RecordingSite, ScriptedEngine};

const KEYS: [&str; 4] = ["a", "b", "c", "missing"];
const LOCALES: [&str; 3] = ["en", "es", "fr"];

#[derive(Debug, Arbitrary)]
enum Op {
    Immediate(u8),
    Deferred(u8),
    Disconnect(u8),
    Drop(u8),
    Resolve(u8),
    Reject(u8),
    Language(u8),
    Resource(u8, u8),
    Reset,
}

#[derive(Debug, Arbitrary)]
struct Input {
    reentry: u8,
    ops: Vec<Op>,
}

struct Slot {
    placeholder: Option<Placeholder>,
    site: Rc<RecordingSite>,
    settler: Option<Settler>,
    frozen: Option<usize>,
}

fuzz_target!(|input: Input| {
    let reentry = match input.reentry % 3 {
        0 => SweepReentry::Coalesce,
        1 => SweepReentry::Allow,
        _ => SweepReentry::Forbid,
    };
    let engine = Rc::new(
        ScriptedEngine::new("en")
            .with_resource("en", "a", "A")
            .with_resource("es", "a", "Á")
            .with_resource("es", "b", "Be"),
    );
    let bindings = Bindings::with_config(
        Rc::clone(&engine) as Rc<dyn TranslationEngine>,
        BindingsConfig::default().with_reentry(reentry),
    );
    let mut slots: Vec<Slot> = Vec::new();

    for op in input.ops.iter().take(256) {
        match *op {
            Op::Immediate(k) => {
                let site = RecordingSite::new();
                let (placeholder, first) =
                    bindings.mount(translate(KEYS[k as usize % KEYS.len()]), site.clone());
                site.apply(&first);
                slots.push(Slot {
                    placeholder: Some(placeholder),
                    site,
                    settler: None,
                    frozen: None,
                });
            }
            Op::Deferred(k) => {
                let site = RecordingSite::new();
                let (readiness, settler) = Readiness::pending();
                let key = KEYS[k as usize % KEYS.len()];
                let (placeholder, first) =
                    bindings.mount(translate_when(&readiness, key), site.clone());
                assert!(first.is_no_change(), "deferred first render must be a no-op");
                slots.push(Slot {
                    placeholder: Some(placeholder),
                    site,
                    settler: Some(settler),
                    frozen: None,
                });
            }
            Op::Disconnect(i) | Op::Drop(i) if !slots.is_empty() => {
                let len = slots.len();
                let slot = &mut slots[i as usize % len];
                if matches!(op, Op::Drop(_)) {
                    slot.placeholder = None;
                } else if let Some(placeholder) = &slot.placeholder {
                    placeholder.on_disconnect();
                }
                if slot.frozen.is_none() {
                    slot.frozen = Some(slot.site.commit_count());
                }
            }
            Op::Resolve(i) | Op::Reject(i) if !slots.is_empty() => {
                let len = slots.len();
                if let Some(settler) = slots[i as usize % len].settler.take() {
                    let result = if matches!(op, Op::Resolve(_)) {
                        settler.resolve()
                    } else {
                        settler.reject(ReadinessError::new("fuzz"))
                    };
                    assert!(result.is_ok(), "first settlement must succeed");
                }
            }
            Op::Language(l) => {
                engine.change_language(LOCALES[l as usize % LOCALES.len()]);
            }
            Op::Resource(l, k) => {
                engine.add_resource(
                    LOCALES[l as usize % LOCALES.len()],
                    KEYS[k as usize % KEYS.len()],
                    "added",
                );
            }
            Op::Reset => bindings.reset(),
            _ => {}
        }

        // Post-conditions that must always hold:
        for slot in &slots {
            if let Some(frozen) = slot.frozen {
                assert_eq!(slot.site.commit_count(), frozen, "commit after unmount");
            }
            if let Some(placeholder) = &slot.placeholder
                && bindings.is_registered(placeholder.id())
            {
                assert!(placeholder.is_connected(), "disconnected placeholder registered");
            }
        }
        let live = slots
            .iter()
            .filter_map(|s| s.placeholder.as_ref())
            .filter(|p| bindings.is_registered(p.id()))
            .count();
        assert_eq!(bindings.live_count(), live, "registry holds unknown entries");
        if let Some(report) = bindings.last_sweep() {
            assert_eq!(report.visited, report.updated + report.unchanged);
        }
    }
});
