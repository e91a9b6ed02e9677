//! Damage calculation - attacker stats + defender stats into a final hit

use super::DamageRoll;
use crate::element::ElementTable;
use crate::stats::Stats;
use crate::types::Element;
use rand::Rng;

/// Minimum value after flat defense, and minimum final damage
pub const DAMAGE_FLOOR: f64 = 1.0;

/// Resolve a hit and return the final damage
///
/// Uses the thread RNG for the crit roll. See [`resolve_damage_with_rng`].
pub fn resolve_damage(
    attacker: &Stats,
    defender: &Stats,
    raw_damage: f64,
    explicit_element: Option<Element>,
) -> u32 {
    let mut rng = rand::thread_rng();
    resolve_damage_with_rng(attacker, defender, raw_damage, explicit_element, &mut rng).amount
}

/// Resolve a hit with a provided RNG (for deterministic testing)
///
/// Steps, in order:
/// 1. Element: explicit override unless it is `None`, else the attacker's element
/// 2. Base: `raw_damage` when positive, else the attacker's attack damage
/// 3. One crit roll: `u < crit_rate` multiplies by `crit_damage`
/// 4. Subtract flat defense, floor at 1.0
/// 5. Elemental triangle factor
/// 6. Defender resistance for the element
/// 7. Round, floor at 1
pub fn resolve_damage_with_rng(
    attacker: &Stats,
    defender: &Stats,
    raw_damage: f64,
    explicit_element: Option<Element>,
    rng: &mut impl Rng,
) -> DamageRoll {
    // Step 1
    let element = match explicit_element {
        Some(e) if e != Element::None => e,
        _ => attacker.attack_element,
    };

    // Step 2
    let base = if raw_damage > 0.0 {
        raw_damage
    } else {
        attacker.attack_damage
    };

    // Step 3: a single Bernoulli trial per call
    let crit_chance = attacker.crit_rate.clamp(0.0, 1.0);
    let is_critical = rng.gen::<f64>() < crit_chance;
    let after_crit = if is_critical {
        base * attacker.crit_damage
    } else {
        base
    };

    // Step 4: floor before the elemental multiply
    let after_defense = (after_crit - defender.defense).max(DAMAGE_FLOOR);

    // Step 5
    let element_multiplier = ElementTable::multiplier(element, defender.defense_element);

    // Step 6
    let resistance = defender.resistance.get(element);

    let unrounded = after_defense * element_multiplier * resistance;

    // Step 7
    let rounded = unrounded.round();
    let amount = if rounded.is_finite() && rounded >= DAMAGE_FLOOR {
        rounded.min(u32::MAX as f64) as u32
    } else {
        1
    };

    DamageRoll {
        element,
        base,
        is_critical,
        after_crit,
        after_defense,
        element_multiplier,
        resistance,
        unrounded,
        amount,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(7)
    }

    fn fire_attacker() -> Stats {
        Stats::new(100, 20.0).with_elements(Element::Fire, Element::Fire)
    }

    fn grass_defender(defense: f64) -> Stats {
        Stats::new(100, 10.0)
            .with_defense(defense)
            .with_elements(Element::Grass, Element::Grass)
    }

    #[test]
    fn test_fire_beats_grass() {
        // 20 - 5 = 15, x1.5 = 22.5, rounds to 23
        let roll = resolve_damage_with_rng(&fire_attacker(), &grass_defender(5.0), 0.0, None, &mut rng());
        assert!((roll.after_defense - 15.0).abs() < f64::EPSILON);
        assert!((roll.unrounded - 22.5).abs() < f64::EPSILON);
        assert_eq!(roll.amount, 23);
    }

    #[test]
    fn test_defense_floor_applies_before_element() {
        // 20 - 25 floors to 1, x1.5 = 1.5, rounds to 2
        let roll = resolve_damage_with_rng(&fire_attacker(), &grass_defender(25.0), 0.0, None, &mut rng());
        assert!((roll.after_defense - 1.0).abs() < f64::EPSILON);
        assert_eq!(roll.amount, 2);
    }

    #[test]
    fn test_raw_damage_overrides_attack() {
        let defender = Stats::new(100, 0.0);
        let attacker = Stats::new(100, 20.0);
        let roll = resolve_damage_with_rng(&attacker, &defender, 42.0, None, &mut rng());
        assert!((roll.base - 42.0).abs() < f64::EPSILON);
        assert_eq!(roll.amount, 42);
    }

    #[test]
    fn test_non_positive_raw_falls_back_to_attack() {
        let defender = Stats::new(100, 0.0);
        let attacker = Stats::new(100, 20.0);
        let roll = resolve_damage_with_rng(&attacker, &defender, -5.0, None, &mut rng());
        assert_eq!(roll.amount, 20);
    }

    #[test]
    fn test_explicit_element_override() {
        // Water attacker forced to Fire against Grass: advantage
        let attacker = Stats::new(100, 10.0).with_elements(Element::Water, Element::Water);
        let roll = resolve_damage_with_rng(&attacker, &grass_defender(0.0), 0.0, Some(Element::Fire), &mut rng());
        assert_eq!(roll.element, Element::Fire);
        assert_eq!(roll.amount, 15);
    }

    #[test]
    fn test_explicit_none_uses_attacker_element() {
        let roll = resolve_damage_with_rng(
            &fire_attacker(),
            &grass_defender(0.0),
            0.0,
            Some(Element::None),
            &mut rng(),
        );
        assert_eq!(roll.element, Element::Fire);
        assert_eq!(roll.amount, 30);
    }

    #[test]
    fn test_guaranteed_crit() {
        let attacker = Stats::new(100, 10.0).with_crit(1.0, 2.0);
        let defender = Stats::new(100, 0.0).with_defense(4.0);
        let roll = resolve_damage_with_rng(&attacker, &defender, 0.0, None, &mut rng());
        // 10 x2 = 20, - 4 = 16
        assert!(roll.is_critical);
        assert_eq!(roll.amount, 16);
    }

    #[test]
    fn test_zero_crit_never_crits() {
        let attacker = Stats::new(100, 10.0).with_crit(0.0, 3.0);
        let defender = Stats::new(100, 0.0);
        let mut rng = rng();
        for _ in 0..200 {
            let roll = resolve_damage_with_rng(&attacker, &defender, 0.0, None, &mut rng);
            assert!(!roll.is_critical);
        }
    }

    #[test]
    fn test_resistance_layers_on_triangle() {
        let defender = grass_defender(0.0).with_resistance(Element::Fire, 0.5);
        let roll = resolve_damage_with_rng(&fire_attacker(), &defender, 0.0, None, &mut rng());
        // 20 x1.5 x0.5 = 15
        assert_eq!(roll.amount, 15);
    }

    #[test]
    fn test_immunity_still_deals_one() {
        let defender = grass_defender(0.0).with_resistance(Element::Fire, 0.0);
        let roll = resolve_damage_with_rng(&fire_attacker(), &defender, 0.0, None, &mut rng());
        assert!((roll.unrounded - 0.0).abs() < f64::EPSILON);
        assert_eq!(roll.amount, 1);
    }

    #[test]
    fn test_zero_attack_still_hits() {
        let attacker = Stats::new(100, 0.0);
        let defender = Stats::new(100, 0.0);
        assert_eq!(resolve_damage(&attacker, &defender, 0.0, None), 1);
    }

    fn element_strategy() -> impl Strategy<Value = Element> {
        prop::sample::select(Element::all().to_vec())
    }

    proptest! {
        #[test]
        fn prop_damage_is_always_positive(
            attack in 0.0f64..10_000.0,
            raw in -100.0f64..10_000.0,
            defense in 0.0f64..10_000.0,
            crit_rate in 0.0f64..=1.0,
            crit_damage in 1.0f64..10.0,
            resist in 0.0f64..5.0,
            attack_element in element_strategy(),
            defense_element in element_strategy(),
            seed in any::<u64>(),
        ) {
            let attacker = Stats::new(100, attack)
                .with_crit(crit_rate, crit_damage)
                .with_elements(attack_element, Element::None);
            let defender = Stats::new(100, 0.0)
                .with_defense(defense)
                .with_elements(Element::None, defense_element)
                .with_resistance(attack_element, resist);
            let mut rng = ChaCha8Rng::seed_from_u64(seed);

            let roll = resolve_damage_with_rng(&attacker, &defender, raw, None, &mut rng);
            prop_assert!(roll.amount >= 1);
            prop_assert!(roll.after_defense >= DAMAGE_FLOOR);
        }
    }
}
