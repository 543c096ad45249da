//! Regular enemies
//!
//! One struct for every kind; `EnemyKind` selects the base-stat row and the
//! AI branch in `update`. Stats are scaled once at spawn by the
//! difficulty multiplier (XP at half rate).

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::EntityId;
use super::bullet::{Bullet, TargetRef};
use super::vector::{VecExt, dir_to, jitter, random_dir};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Grunt,
    Speeder,
    Tank,
    Seeker,
    Swarmer,
    Brute,
    Sniper,
    Exploder,
    Waver,
    Teleporter,
    Turret,
    Orbit,
    Armored,
    Ghost,
    Fractal,
    Mender,
    Lancer,
    Vortex,
    Trailblazer,
    Layer,
    Beamer,
    Aegis,
    Glitch,
    Carrier,
    /// Kamikaze stunner; destroys itself on contact
    ElectricSpeeder,
    /// Monolith shield pylon
    MiniMonolith,
}

/// Unscaled per-kind stats
#[derive(Debug, Clone, Copy)]
pub struct BaseStats {
    pub hp: f32,
    pub speed: f32,
    pub size: f32,
    pub damage: f32,
    pub xp: u32,
    pub fire_rate: f32,
}

const fn stats(hp: f32, speed: f32, size: f32, damage: f32, xp: u32, fire_rate: f32) -> BaseStats {
    BaseStats {
        hp,
        speed,
        size,
        damage,
        xp,
        fire_rate,
    }
}

impl EnemyKind {
    pub fn base_stats(self) -> BaseStats {
        use EnemyKind::*;
        match self {
            Grunt => stats(15.0, 2.0, 20.0, 8.0, 10, 0.0),
            Speeder => stats(10.0, 3.2, 15.0, 5.0, 15, 0.0),
            Tank => stats(80.0, 1.2, 35.0, 15.0, 40, 0.0),
            Seeker => stats(30.0, 1.8, 25.0, 8.0, 25, 180.0),
            Swarmer => stats(5.0, 3.8, 10.0, 4.0, 5, 0.0),
            Brute => stats(150.0, 0.8, 45.0, 20.0, 80, 0.0),
            Sniper => stats(25.0, 1.5, 20.0, 20.0, 35, 220.0),
            Exploder => stats(15.0, 2.2, 22.0, 15.0, 20, 0.0),
            Waver => stats(25.0, 2.5, 18.0, 8.0, 20, 0.0),
            Teleporter => stats(40.0, 1.0, 25.0, 10.0, 45, 0.0),
            Turret => stats(80.0, 0.0, 30.0, 10.0, 50, 60.0),
            Orbit => stats(35.0, 2.2, 20.0, 8.0, 30, 120.0),
            Armored => stats(200.0, 0.9, 25.0, 10.0, 60, 0.0),
            Ghost => stats(30.0, 2.0, 22.0, 12.0, 30, 0.0),
            Fractal => stats(60.0, 1.5, 30.0, 10.0, 50, 0.0),
            Mender => stats(50.0, 2.5, 20.0, 0.0, 40, 0.0),
            Lancer => stats(35.0, 2.0, 15.0, 15.0, 30, 0.0),
            Vortex => stats(120.0, 0.5, 40.0, 8.0, 60, 0.0),
            Trailblazer => stats(30.0, 3.5, 15.0, 8.0, 35, 20.0),
            Layer => stats(55.0, 1.5, 25.0, 10.0, 40, 180.0),
            Beamer => stats(30.0, 1.0, 20.0, 18.0, 30, 240.0),
            Aegis => stats(400.0, 0.6, 50.0, 25.0, 100, 0.0),
            Glitch => stats(50.0, 4.0, 20.0, 12.0, 50, 45.0),
            Carrier => stats(300.0, 0.8, 50.0, 10.0, 120, 300.0),
            ElectricSpeeder => stats(30.0, 5.0, 18.0, 15.0, 25, 0.0),
            MiniMonolith => stats(100.0, 0.0, 30.0, 10.0, 0, 90.0),
        }
    }

    /// Lowercase identifier, also used in elite names
    pub fn name(self) -> &'static str {
        use EnemyKind::*;
        match self {
            Grunt => "grunt",
            Speeder => "speeder",
            Tank => "tank",
            Seeker => "seeker",
            Swarmer => "swarmer",
            Brute => "brute",
            Sniper => "sniper",
            Exploder => "exploder",
            Waver => "waver",
            Teleporter => "teleporter",
            Turret => "turret",
            Orbit => "orbit",
            Armored => "armored",
            Ghost => "ghost",
            Fractal => "fractal",
            Mender => "mender",
            Lancer => "lancer",
            Vortex => "vortex",
            Trailblazer => "trailblazer",
            Layer => "layer",
            Beamer => "beamer",
            Aegis => "aegis",
            Glitch => "glitch",
            Carrier => "carrier",
            ElectricSpeeder => "electric_speeder",
            MiniMonolith => "mini_monolith",
        }
    }

    /// Whether this kind pushes away from overlapping neighbours
    fn separates(self) -> bool {
        !matches!(
            self,
            EnemyKind::Turret | EnemyKind::Ghost | EnemyKind::Vortex | EnemyKind::MiniMonolith
        )
    }

    /// Regular spawn pool for a wave; later waves add kinds, never remove
    pub fn spawn_pool(wave: u32) -> Vec<EnemyKind> {
        use EnemyKind::*;
        let mut pool = vec![Grunt];
        if wave > 2 {
            pool.push(Speeder);
        }
        if wave > 4 {
            pool.push(Tank);
        }
        if wave > 6 {
            pool.extend([Seeker, Swarmer]);
        }
        if wave > 8 {
            pool.extend([Brute, Exploder]);
        }
        if wave > 10 {
            pool.extend([Sniper, Waver, Turret]);
        }
        if wave > 12 {
            pool.extend([Teleporter, Orbit]);
        }
        if wave > 15 {
            pool.extend([Armored, Ghost, Fractal]);
        }
        if wave > 18 {
            pool.extend([Mender, Lancer, Vortex]);
        }
        if wave > 20 {
            pool.extend([Trailblazer, Layer, Beamer]);
        }
        if wave > 25 {
            pool.extend([Aegis, Glitch, Carrier, ElectricSpeeder]);
        }
        pool
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AiState {
    #[default]
    Chase,
    Prepare,
    Dash,
    Teleporting,
    Flee,
}

/// An enemy another entity wants added to the arena
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnRequest {
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub difficulty_mult: f32,
}

/// Snapshot of a nearby enemy handed to `Enemy::update`.
/// `slot` indexes the orchestrator's enemy list for this tick.
#[derive(Debug, Clone, Copy)]
pub struct Neighbor {
    pub slot: usize,
    pub id: EntityId,
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub size: f32,
    pub hp: f32,
    pub max_hp: f32,
}

/// What an enemy asks the orchestrator to do after its update
#[derive(Debug, Default)]
pub struct EnemyAction {
    pub bullet: Option<Bullet>,
    /// Heal the neighbour in `slot` by `amount`, capped at its max
    pub heal: Option<(usize, f32)>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: EntityId,
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub hp: f32,
    pub max_hp: f32,
    pub damage: f32,
    pub speed: f32,
    pub size: f32,
    pub xp_value: u32,
    pub difficulty_mult: f32,
    pub ai: AiState,
    pub state_timer: u32,
    pub dash_dir: Vec2,
    pub fire_timer: f32,
    pub fire_rate: f32,
    /// Children waiting to be drained into the arena
    pub pending_spawns: Vec<SpawnRequest>,
}

impl Enemy {
    const MENDER_RANGE: f32 = 150.0;
    const MENDER_HEAL: f32 = 0.5;
    const SEPARATION_PUSH: f32 = 0.5;

    pub fn new<R: Rng + ?Sized>(
        id: EntityId,
        kind: EnemyKind,
        pos: Vec2,
        difficulty_mult: f32,
        rng: &mut R,
    ) -> Self {
        let base = kind.base_stats();
        let hp = base.hp * difficulty_mult;
        let xp_value = (base.xp as f32 * (1.0 + (difficulty_mult - 1.0) * 0.5)).ceil() as u32;
        Self {
            id,
            kind,
            pos,
            vel: Vec2::ZERO,
            hp,
            max_hp: hp,
            damage: base.damage * difficulty_mult,
            speed: base.speed,
            size: base.size,
            xp_value,
            difficulty_mult,
            ai: AiState::Chase,
            state_timer: 0,
            dash_dir: Vec2::ZERO,
            fire_timer: rng.random::<f32>() * 100.0,
            fire_rate: base.fire_rate,
            pending_spawns: Vec::new(),
        }
    }

    /// Below 30% health; drawn cracked and flashing
    pub fn is_low_health(&self) -> bool {
        self.hp < self.max_hp * 0.3
    }

    pub fn neighbor(&self, slot: usize) -> Neighbor {
        Neighbor {
            slot,
            id: self.id,
            kind: self.kind,
            pos: self.pos,
            size: self.size,
            hp: self.hp,
            max_hp: self.max_hp,
        }
    }

    fn aimed(&self, vel: Vec2, damage: f32, radius: f32, life: i32) -> Bullet {
        Bullet::hostile(self.pos, vel, damage, radius, life)
    }

    /// Run this enemy's AI for one tick. `speed_mult` scales its own
    /// movement speed (time warp).
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        player_pos: Vec2,
        neighbors: &[Neighbor],
        speed_mult: f32,
        rng: &mut R,
    ) -> EnemyAction {
        use EnemyKind::*;

        let mut action = EnemyAction::default();
        let speed = self.speed * speed_mult;
        let dist = self.pos.distance(player_pos);
        let to_player = dir_to(self.pos, player_pos);

        match self.kind {
            Carrier => {
                self.vel = to_player * speed;
                self.fire_timer += 1.0;
                if self.fire_timer > self.fire_rate {
                    self.fire_timer = 0.0;
                    for _ in 0..3 {
                        self.pending_spawns.push(SpawnRequest {
                            kind: Swarmer,
                            pos: self.pos + jitter(rng, 20.0),
                            difficulty_mult: self.difficulty_mult,
                        });
                    }
                }
            }
            ElectricSpeeder | Vortex => {
                self.vel = to_player * speed;
            }
            MiniMonolith => {
                self.fire_timer += 1.0;
                if self.fire_timer > self.fire_rate {
                    self.fire_timer = 0.0;
                    action.bullet = Some(self.aimed(to_player * 6.0, self.damage, 5.0, 120));
                }
            }
            Mender => {
                // Lowest health fraction among hurt non-menders
                let mut target: Option<&Neighbor> = None;
                let mut min_pct = 1.0;
                for n in neighbors {
                    if n.id != self.id && n.hp < n.max_hp && n.kind != Mender {
                        let pct = n.hp / n.max_hp;
                        if pct < min_pct {
                            min_pct = pct;
                            target = Some(n);
                        }
                    }
                }
                if let Some(target) = target {
                    let to_target = target.pos - self.pos;
                    if to_target.length() < Self::MENDER_RANGE {
                        action.heal = Some((target.slot, Self::MENDER_HEAL));
                        self.vel = Vec2::ZERO;
                    } else {
                        self.vel = to_target.norm() * speed;
                    }
                    self.ai = AiState::Chase;
                } else if dist < 300.0 {
                    self.vel = to_player * -speed;
                    self.ai = AiState::Flee;
                } else {
                    self.vel = (self.vel + random_dir(rng) * 0.2).limit(speed);
                    self.ai = AiState::Chase;
                }
            }
            Lancer => {
                self.state_timer += 1;
                match self.ai {
                    AiState::Prepare => {
                        if self.state_timer > 45 {
                            self.ai = AiState::Dash;
                            self.state_timer = 0;
                        }
                    }
                    AiState::Dash => {
                        self.vel = self.dash_dir * 12.0;
                        if self.state_timer > 20 {
                            self.ai = AiState::Chase;
                            self.state_timer = 0;
                            self.vel *= 0.1;
                        }
                    }
                    _ => {
                        self.dash_dir = (self.dash_dir + to_player * 0.1).norm();
                        self.vel = self.dash_dir * speed;
                        if self.state_timer > 90 && dist < 400.0 {
                            self.ai = AiState::Prepare;
                            self.state_timer = 0;
                            self.vel = Vec2::ZERO;
                            self.dash_dir = to_player;
                        }
                    }
                }
                if self.dash_dir == Vec2::ZERO {
                    self.dash_dir = to_player;
                }
            }
            Trailblazer => {
                if rng.random::<f32>() < 0.05 {
                    self.dash_dir = random_dir(rng);
                }
                let heading = (to_player * 0.5 + self.dash_dir * 0.5).norm();
                self.vel = heading * speed;
                self.fire_timer += 1.0;
                if self.fire_timer > self.fire_rate {
                    self.fire_timer = 0.0;
                    // Stationary mine
                    let dmg = 5.0 * self.difficulty_mult;
                    action.bullet = Some(self.aimed(Vec2::ZERO, dmg, 4.0, 180));
                }
            }
            Layer => {
                if dist < 400.0 {
                    self.vel = to_player * -speed;
                    self.ai = AiState::Flee;
                } else {
                    self.vel = to_player * (speed * 0.5);
                    self.ai = AiState::Chase;
                }
                self.fire_timer += 1.0;
                if self.fire_timer > self.fire_rate {
                    self.fire_timer = 0.0;
                    let dmg = 25.0 * self.difficulty_mult;
                    action.bullet = Some(self.aimed(Vec2::ZERO, dmg, 8.0, 600));
                }
            }
            Beamer => {
                if dist > 400.0 {
                    self.vel = to_player * speed;
                } else {
                    self.vel *= 0.9;
                }
                self.fire_timer += 1.0;
                if self.fire_timer > self.fire_rate {
                    self.fire_timer = 0.0;
                    action.bullet = Some(self.aimed(to_player * 15.0, self.damage, 4.0, 120));
                }
            }
            Glitch => {
                self.state_timer += 1;
                self.ai = AiState::Chase;
                if self.state_timer > 60 {
                    self.state_timer = 0;
                    let reach = 150.0 + rng.random::<f32>() * 200.0;
                    self.pos = player_pos + random_dir(rng) * reach;
                    self.ai = AiState::Teleporting;
                }
                self.fire_timer += 1.0;
                if self.fire_timer > self.fire_rate {
                    self.fire_timer = 0.0;
                    action.bullet = Some(self.aimed(to_player * 8.0, self.damage, 4.0, 120));
                }
            }
            Turret => {
                self.fire_timer += 1.0;
                if self.fire_timer >= self.fire_rate && dist < 600.0 {
                    self.fire_timer = 0.0;
                    action.bullet = Some(
                        self.aimed(to_player * 6.0, self.damage, 4.0, 120)
                            .with_target(Some(TargetRef::Player)),
                    );
                }
            }
            Sniper => {
                self.keep_band(dist, to_player, speed, 500.0, 50.0, 1.0);
                self.fire_timer += 1.0;
                if self.fire_timer >= self.fire_rate {
                    self.fire_timer = 0.0;
                    action.bullet = Some(self.aimed(to_player * 12.0, self.damage, 4.0, 120));
                }
            }
            Orbit => {
                let pull = if dist < 200.0 {
                    -0.5
                } else if dist > 300.0 {
                    0.5
                } else {
                    0.0
                };
                let heading = (to_player.perp_left() + to_player * pull).norm();
                self.vel = heading * speed;
                self.fire_timer += 1.0;
                if self.fire_timer >= self.fire_rate {
                    self.fire_timer = 0.0;
                    action.bullet = Some(
                        self.aimed(to_player * 5.0, self.damage, 4.0, 120)
                            .with_target(Some(TargetRef::Player)),
                    );
                }
            }
            Teleporter => {
                self.state_timer += 1;
                if self.state_timer > 120 {
                    self.state_timer = 0;
                    self.pos = player_pos + random_dir(rng) * 150.0;
                    self.ai = AiState::Teleporting;
                } else {
                    self.vel = to_player * speed;
                    self.ai = AiState::Chase;
                }
            }
            Waver => {
                self.state_timer += 1;
                let sway = (self.state_timer as f32 * 0.1).sin();
                self.vel = (to_player + to_player.perp_left() * sway).norm() * speed;
            }
            Exploder => {
                let burst = if dist < 150.0 { 2.5 } else { 1.0 };
                self.vel = to_player * (speed * burst);
            }
            Speeder => {
                self.state_timer += 1;
                match self.ai {
                    AiState::Prepare => {
                        if self.state_timer > 40 {
                            self.ai = AiState::Dash;
                            self.state_timer = 0;
                            self.vel = self.dash_dir * (speed * 4.0);
                        }
                    }
                    AiState::Dash => {
                        self.vel *= 0.96;
                        if self.state_timer > 40 {
                            self.ai = AiState::Chase;
                            self.state_timer = 0;
                        }
                    }
                    _ => {
                        self.vel = to_player * speed;
                        if self.state_timer > 60 && rng.random::<f32>() < 0.01 {
                            self.ai = AiState::Prepare;
                            self.state_timer = 0;
                            self.vel = Vec2::ZERO;
                            self.dash_dir = to_player;
                        }
                    }
                }
            }
            Seeker => {
                self.keep_band(dist, to_player, speed, 350.0, 50.0, 0.8);
                self.fire_timer += 1.0;
                if self.fire_timer >= self.fire_rate {
                    self.fire_timer = 0.0;
                    action.bullet = Some(
                        self.aimed(to_player * 4.0, self.damage, 4.0, 120)
                            .with_target(Some(TargetRef::Player)),
                    );
                }
            }
            Grunt | Tank | Swarmer | Brute | Armored | Ghost | Fractal | Aegis => {
                self.vel = to_player * speed;
            }
        }

        if self.ai != AiState::Dash && self.kind.separates() {
            for other in neighbors {
                if other.id == self.id {
                    continue;
                }
                if self.pos.distance(other.pos) < self.size + other.size {
                    self.vel += (self.pos - other.pos).norm() * Self::SEPARATION_PUSH;
                }
            }
        }

        self.pos += self.vel;
        action
    }

    /// Ranged kiting: close in beyond the band, back off inside it, brake within
    fn keep_band(
        &mut self,
        dist: f32,
        to_player: Vec2,
        speed: f32,
        ideal: f32,
        slack: f32,
        retreat: f32,
    ) {
        if dist > ideal + slack {
            self.vel = to_player * speed;
        } else if dist < ideal - slack {
            self.vel = to_player * (-speed * retreat);
        } else {
            self.vel *= 0.9;
        }
    }
}
