#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use war_advisor::modifiers::{Condition, Effect, Modifier, ModifierTarget};
use war_advisor::{Attribute, AttributeVector, Conditions, ModifierTable, apply_modifiers};

/// One table entry.
#[derive(Arbitrary, Debug)]
struct EntryInput {
    /// Attribute index (8 means ALL).
    target: u8,
    /// Factor; `None` means CRITICAL.
    factor: Option<f64>,
}

/// Structured input for modifier fuzzing.
#[derive(Arbitrary, Debug)]
struct ModifierInput {
    /// Army profile, normalised into `[0, 1]` before use.
    army: [f64; 8],
    /// Terrain entries.
    terrain: Vec<EntryInput>,
    /// Weather entries.
    weather: Vec<EntryInput>,
    /// Troop status entries.
    status: Vec<EntryInput>,
}

fn effects(entries: &[EntryInput], allow_all: bool) -> Vec<Effect> {
    let mut seen = Vec::new();
    entries
        .iter()
        .take(16)
        .filter_map(|e| {
            let index = usize::from(e.target % 9);
            let target = match Attribute::ALL.get(index) {
                Some(attribute) => ModifierTarget::Attribute(*attribute),
                None if allow_all => ModifierTarget::All,
                None => return None,
            };
            let modifier = match e.factor {
                Some(f) if f.is_finite() => Modifier::Factor(f.abs().min(1e6)),
                Some(_) => return None,
                None if target == ModifierTarget::All => return None,
                None => Modifier::Critical,
            };
            if seen.contains(&target) {
                return None;
            }
            seen.push(target);
            Some(Effect { target, modifier })
        })
        .collect()
}

fuzz_target!(|input: ModifierInput| {
    let army = AttributeVector::new(input.army.map(|v| if v.is_finite() { v.abs().fract() } else { 0.5 }));

    let Ok(table) = ModifierTable::new(
        vec![Condition::new("terrain", effects(&input.terrain, false))],
        vec![Condition::new("weather", effects(&input.weather, false))],
        vec![Condition::new("status", effects(&input.status, true))],
    ) else {
        return;
    };

    let conditions = Conditions {
        terrain: Some("terrain"),
        weather: Some("weather"),
        troop_status: Some("status"),
    };
    let modified = apply_modifiers(&army, &conditions, &table);

    assert!(modified.vector.is_normalized(), "profile escaped [0, 1]: {:?}", modified.vector);
    assert!(modified.warnings.len() <= 24);
});
