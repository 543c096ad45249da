//! Stat upgrades, powers, and the level-up offer
//!
//! The catalog is static and selected by weighted sampling without
//! replacement. Offers travel through events and back into
//! `install_upgrade` as `LevelUpOption`s, which name entries by id so they
//! can be serialized with the rest of the state.

use std::sync::LazyLock;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::player::{ActiveSkill, PassivePower, Perk, Player};
use crate::consts::POWER_LEVEL_INTERVAL;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tier {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
    /// High risk, high reward
    Glitch,
    /// Unlocked by an existing build
    Synergy,
    Omega,
}

impl Tier {
    /// Default selection weight
    pub fn weight(self) -> u32 {
        match self {
            Self::Common => 100,
            Self::Uncommon => 60,
            Self::Rare => 30,
            Self::Epic => 15,
            Self::Legendary => 5,
            Self::Glitch => 8,
            Self::Synergy => 10,
            Self::Omega => 1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Common => "COMMON (v1.0)",
            Self::Uncommon => "UNCOMMON (v2.0)",
            Self::Rare => "RARE (v3.0)",
            Self::Epic => "EPIC (v4.0)",
            Self::Legendary => "LEGENDARY (v5.0)",
            Self::Glitch => "FATAL_ERROR",
            Self::Synergy => "SYSTEM_SYNC",
            Self::Omega => "ΩMEGA",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Offense,
    Defense,
    Utility,
    Tech,
    Ballistics,
    Special,
}

/// A catalog stat upgrade
pub struct Upgrade {
    pub id: String,
    pub name: String,
    pub description: &'static str,
    pub tier: Tier,
    pub category: Category,
    pub tags: &'static [&'static str],
    pub weight: u32,
    pub apply: fn(&mut Player),
    /// Only offered while this holds
    pub requirement: Option<fn(&Player) -> bool>,
}

impl std::fmt::Debug for Upgrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Upgrade")
            .field("id", &self.id)
            .field("tier", &self.tier)
            .field("weight", &self.weight)
            .finish()
    }
}

impl Upgrade {
    fn stat(
        id: &str,
        name: &str,
        tier: Tier,
        description: &'static str,
        apply: fn(&mut Player),
        category: Category,
        tags: &'static [&'static str],
    ) -> Self {
        Self {
            id: id.to_owned(),
            name: name.to_owned(),
            description,
            tier,
            category,
            tags,
            weight: tier.weight(),
            apply,
            requirement: None,
        }
    }

    fn with_weight(mut self, weight: u32) -> Self {
        self.weight = weight;
        self
    }

    fn requires(mut self, requirement: fn(&Player) -> bool) -> Self {
        self.requirement = Some(requirement);
        self
    }

    pub fn is_available(&self, player: &Player) -> bool {
        self.requirement.is_none_or(|req| req(player))
    }
}

pub static CATALOG: LazyLock<Vec<Upgrade>> = LazyLock::new(build_catalog);

#[rustfmt::skip]
fn build_catalog() -> Vec<Upgrade> {
    use Category::*;
    use Tier::*;

    let mut catalog = vec![
        Upgrade::stat("dmg_1", "Force Module", Common, "+10% Damage", |p| p.damage *= 1.1, Offense, &["damage"]),
        Upgrade::stat("rate_1", "Cycle Booster", Common, "+10% Fire Rate", |p| p.fire_rate *= 0.9, Offense, &["fire_rate"]),
        Upgrade::stat("multi_1", "Split Chamber", Rare, "+1 Projectile", |p| p.projectiles += 1, Offense, &["multishot"]),
        Upgrade::stat("crit_dmg", "Lethal Output", Uncommon, "+20% Crit Dmg", |p| p.crit_mult += 0.2, Offense, &["crit"]),
        Upgrade::stat(
            "hp_1",
            "Hull Plating",
            Common,
            "+15 Max HP",
            |p| {
                p.max_hp += 15.0;
                p.hp += 15.0;
            },
            Defense,
            &["tank"],
        ),
        Upgrade::stat("regen_1", "Nanobots", Uncommon, "+1 HP/sec", |p| p.regen += 1.0, Defense, &["sustain"]),
        Upgrade::stat("armor_1", "Reinforced Mesh", Rare, "+25 Max HP", |p| p.max_hp += 25.0, Defense, &["tank"]),
        Upgrade::stat("mag_1", "Tractor Beam", Common, "+50 Pickup Range", |p| p.magnet_radius += 50.0, Utility, &["magnet"]),
        Upgrade::stat("xp_1", "Neural Link", Common, "+15% XP Gain", |p| p.xp_mult *= 1.15, Utility, &["xp"]),
        Upgrade::stat("spd_1", "Thruster", Common, "+10% Speed", |p| p.speed *= 1.1, Utility, &["speed"]),
        Upgrade::stat(
            "dash_cd",
            "Coolant Injector",
            Uncommon,
            "-15% Dash Cooldown",
            |p| p.dash_cooldown_mult *= 0.85,
            Utility,
            &["dash"],
        ),
        Upgrade::stat(
            "dash_dist",
            "Afterburner",
            Uncommon,
            "+20% Dash Distance",
            |p| p.dash_duration = (p.dash_duration as f32 * 1.2).round() as u32,
            Utility,
            &["dash"],
        ),
        Upgrade::stat(
            "syn_static",
            "Static Friction",
            Synergy,
            "Running generates electricity (Dmg Aura)",
            |p| {
                p.perks.insert(Perk::PlasmaAura);
                p.perks.insert(Perk::StaticFriction);
                p.speed *= 1.1;
            },
            Special,
            &["speed", "electric"],
        )
        .with_weight(20)
        .requires(|p| p.speed > 8.0),
        Upgrade::stat(
            "syn_vampire",
            "Blood Cooling",
            Synergy,
            "Crit Kills heal 1 HP",
            |p| p.perks.insert(Perk::Vampirism),
            Special,
            &["crit", "sustain"],
        )
        .with_weight(20)
        .requires(|p| p.crit_chance > 0.2),
        Upgrade::stat(
            "syn_heavy",
            "Heavy Artillery",
            Synergy,
            "Convert Speed to Damage (1:5 ratio)",
            |p| {
                let sacrifice = p.speed * 0.2;
                p.speed -= sacrifice;
                p.damage += sacrifice * 50.0;
            },
            Offense,
            &["damage", "tank"],
        )
        .with_weight(20)
        .requires(|p| p.damage > 50.0 && p.max_hp > 200.0),
        Upgrade::stat(
            "glitch_segfault",
            "Segmentation Fault",
            Glitch,
            "Projectiles phase through walls but you take +50% Dmg",
            |p| {
                p.piercing += 10;
                p.max_hp = (p.max_hp * 0.8).floor();
                p.hp = p.hp.min(p.max_hp);
                p.perks.insert(Perk::SegFault);
            },
            Special,
            &["glitch"],
        )
        .with_weight(10),
        Upgrade::stat(
            "glitch_memory_leak",
            "Memory Leak",
            Glitch,
            "+100% Fire Rate, but you constantly lose XP",
            |p| {
                p.fire_rate *= 0.5;
                p.perks.insert(Perk::MemoryLeak);
            },
            Offense,
            &["glitch", "fire_rate"],
        )
        .with_weight(10),
        Upgrade::stat(
            "glitch_kernel_panic",
            "KERNEL_PANIC",
            Glitch,
            "Set HP to 1. Damage x5. Shield +100.",
            |p| {
                p.max_hp = 1.0;
                p.hp = 1.0;
                p.damage *= 5.0;
                p.invulnerable = 120;
            },
            Special,
            &["glitch", "glass_cannon"],
        )
        .with_weight(5),
    ];

    for i in 0..5 {
        catalog.push(Upgrade::stat(
            &format!("common_dmg_{i}"),
            &format!("Patch v1.{i}"),
            Common,
            "+10% Dmg",
            |p| p.damage *= 1.1,
            Offense,
            &["damage"],
        ));
    }
    for i in 0..5 {
        catalog.push(Upgrade::stat(
            &format!("common_hp_{i}"),
            &format!("Patch v2.{i}"),
            Common,
            "+25 HP",
            |p| {
                p.max_hp += 25.0;
                p.hp += 25.0;
            },
            Defense,
            &["tank"],
        ));
    }
    catalog
}

pub fn upgrade_by_id(id: &str) -> Option<&'static Upgrade> {
    CATALOG.iter().find(|u| u.id == id)
}

/// Powers offered on every tenth level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Power {
    Active(ActiveSkill),
    Passive(PassivePower),
}

pub const POWERS: [Power; 7] = [
    Power::Active(ActiveSkill::Shockwave),
    Power::Active(ActiveSkill::MissileSwarm),
    Power::Active(ActiveSkill::TimeWarp),
    Power::Active(ActiveSkill::Overload),
    Power::Active(ActiveSkill::BlackHole),
    Power::Passive(PassivePower::AllyDrone),
    Power::Passive(PassivePower::PlasmaAura),
];

impl Power {
    pub fn id(self) -> &'static str {
        match self {
            Self::Active(s) => s.id(),
            Self::Passive(p) => p.id(),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Active(ActiveSkill::Shockwave) => "Logic Bomb",
            Self::Active(ActiveSkill::MissileSwarm) => "Missile Swarm",
            Self::Active(ActiveSkill::TimeWarp) => "Time Warp",
            Self::Active(ActiveSkill::Overload) => "Overload",
            Self::Active(ActiveSkill::BlackHole) => "Singularity",
            Self::Passive(PassivePower::AllyDrone) => "Attack Drone",
            Self::Passive(PassivePower::PlasmaAura) => "Plasma Aura",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Active(ActiveSkill::Shockwave) => "Release a massive expanding energy ring.",
            Self::Active(ActiveSkill::MissileSwarm) => "Launch 16 homing missiles.",
            Self::Active(ActiveSkill::TimeWarp) => "Slow down time for enemies by 85%.",
            Self::Active(ActiveSkill::Overload) => "Quadruple fire rate for 5 seconds.",
            Self::Active(ActiveSkill::BlackHole) => "Summon a gravity well that crushes enemies.",
            Self::Passive(PassivePower::AllyDrone) => "Spawns an autonomous support unit (Max 3).",
            Self::Passive(PassivePower::PlasmaAura) => "Deal constant damage to nearby enemies.",
        }
    }

    /// Actives are offered once; passives can repeat
    fn is_offerable(self, player: &Player) -> bool {
        match self {
            Self::Active(skill) => !player.active_skills.contains(&skill),
            Self::Passive(_) => true,
        }
    }
}

/// One choice in a level-up offer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelUpOption {
    /// Catalog upgrade, by id
    Upgrade(String),
    Power(Power),
}

impl LevelUpOption {
    pub fn name(&self) -> &str {
        match self {
            Self::Upgrade(id) => upgrade_by_id(id).map_or(id.as_str(), |u| u.name.as_str()),
            Self::Power(p) => p.name(),
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Self::Upgrade(id) => upgrade_by_id(id).map_or("", |u| u.description),
            Self::Power(p) => p.description(),
        }
    }
}

/// Weighted sample of `count` distinct upgrades the player qualifies for.
/// Falls back to the first common entries if sampling comes up short.
pub fn weighted_upgrades<R: Rng + ?Sized>(
    count: usize,
    player: &Player,
    rng: &mut R,
) -> Vec<&'static Upgrade> {
    let pool: Vec<&'static Upgrade> = CATALOG.iter().filter(|u| u.is_available(player)).collect();
    let total: u32 = pool.iter().map(|u| u.weight).sum();
    let mut picked: Vec<&'static Upgrade> = Vec::with_capacity(count);

    let max_attempts = count * 10;
    let mut attempts = 0;
    while picked.len() < count && attempts < max_attempts && total > 0 {
        attempts += 1;
        let mut roll = rng.random::<f32>() * total as f32;
        let mut selected = None;
        for u in &pool {
            if roll < u.weight as f32 {
                selected = Some(*u);
                break;
            }
            roll -= u.weight as f32;
        }
        if let Some(u) = selected {
            if !picked.iter().any(|p| p.id == u.id) {
                picked.push(u);
            }
        }
    }

    if picked.len() < count {
        let short = count - picked.len();
        picked.extend(CATALOG.iter().filter(|u| u.tier == Tier::Common).take(short));
    }
    picked
}

/// The three choices shown on level-up. Every tenth level offers powers
/// instead, topped up with upgrades.
pub fn level_up_options<R: Rng + ?Sized>(player: &Player, rng: &mut R) -> Vec<LevelUpOption> {
    const OFFER: usize = 3;

    if player.level % POWER_LEVEL_INTERVAL == 0 {
        let mut powers: Vec<Power> = POWERS
            .iter()
            .copied()
            .filter(|p| p.is_offerable(player))
            .collect();
        powers.shuffle(rng);
        powers.truncate(OFFER);
        let short = OFFER - powers.len();

        let mut options: Vec<LevelUpOption> =
            powers.into_iter().map(LevelUpOption::Power).collect();
        if short > 0 {
            options.extend(
                weighted_upgrades(short, player, rng)
                    .into_iter()
                    .map(|u| LevelUpOption::Upgrade(u.id.clone())),
            );
        }
        options
    } else {
        weighted_upgrades(OFFER, player, rng)
            .into_iter()
            .map(|u| LevelUpOption::Upgrade(u.id.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_catalog_ids_unique() {
        let mut ids: Vec<&str> = CATALOG.iter().map(|u| u.id.as_str()).collect();
        let n = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), n);
        assert_eq!(upgrade_by_id("glitch_memory_leak").map(|u| u.weight), Some(10));
        assert_eq!(upgrade_by_id("syn_heavy").map(|u| u.weight), Some(20));
        assert_eq!(upgrade_by_id("dmg_1").map(|u| u.weight), Some(100));
    }

    #[test]
    fn test_selection_distinct_and_respects_requirements() {
        let mut rng = Pcg32::seed_from_u64(9);
        let player = Player::new();
        for _ in 0..50 {
            let picks = weighted_upgrades(3, &player, &mut rng);
            assert_eq!(picks.len(), 3);
            assert!(picks.iter().all(|u| u.is_available(&player)));
            assert!(picks.iter().all(|u| !u.id.starts_with("syn_")));
            assert_ne!(picks[0].id, picks[1].id);
            assert_ne!(picks[1].id, picks[2].id);
            assert_ne!(picks[0].id, picks[2].id);
        }
    }

    #[test]
    fn test_synergy_unlocks() {
        let mut player = Player::new();
        let heavy = upgrade_by_id("syn_heavy").map(|u| u.is_available(&player));
        assert_eq!(heavy, Some(false));
        player.damage = 60.0;
        player.max_hp = 250.0;
        let heavy = upgrade_by_id("syn_heavy").map(|u| u.is_available(&player));
        assert_eq!(heavy, Some(true));
    }

    #[test]
    fn test_heavy_artillery_converts_speed() {
        let mut player = Player::new();
        player.speed = 10.0;
        player.damage = 60.0;
        if let Some(u) = upgrade_by_id("syn_heavy") {
            (u.apply)(&mut player);
        }
        assert!((player.speed - 8.0).abs() < 1e-5);
        assert!((player.damage - 160.0).abs() < 1e-4);
    }

    #[test]
    fn test_glitches_set_perks() {
        let mut player = Player::new();
        for id in ["glitch_segfault", "glitch_memory_leak"] {
            if let Some(u) = upgrade_by_id(id) {
                (u.apply)(&mut player);
            }
        }
        assert!(player.has_perk(Perk::SegFault));
        assert!(player.has_perk(Perk::MemoryLeak));
        assert_eq!(player.max_hp, 80.0);
        assert_eq!(player.piercing, 11);
    }

    #[test]
    fn test_power_level_offers_powers() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut player = Player::new();
        player.level = 10;
        let options = level_up_options(&player, &mut rng);
        assert_eq!(options.len(), 3);
        assert!(options.iter().all(|o| matches!(o, LevelUpOption::Power(_))));

        player.level = 11;
        let options = level_up_options(&player, &mut rng);
        assert!(options.iter().all(|o| matches!(o, LevelUpOption::Upgrade(_))));
    }

    #[test]
    fn test_equipped_actives_not_reoffered() {
        let mut rng = Pcg32::seed_from_u64(4);
        let mut player = Player::new();
        player.level = 20;
        for p in POWERS {
            if let Power::Active(skill) = p {
                player.equip_skill(skill);
            }
        }
        for _ in 0..20 {
            let options = level_up_options(&player, &mut rng);
            assert_eq!(options.len(), 3);
            let powers: Vec<_> = options
                .iter()
                .filter_map(|o| match o {
                    LevelUpOption::Power(p) => Some(*p),
                    LevelUpOption::Upgrade(_) => None,
                })
                .collect();
            assert_eq!(powers.len(), 2);
            assert!(powers.iter().all(|p| matches!(p, Power::Passive(_))));
        }
    }

    #[test]
    fn test_option_names() {
        let o = LevelUpOption::Upgrade("mag_1".into());
        assert_eq!(o.name(), "Tractor Beam");
        assert_eq!(LevelUpOption::Power(POWERS[0]).name(), "Logic Bomb");
    }
}
