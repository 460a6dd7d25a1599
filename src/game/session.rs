//! Match lifecycle: lobby, turn coordination and round resolution.
//!
//! Players alternate turns. Each turn commits exactly one command; once both
//! players have committed for the current round the three lanes resolve in
//! order (guard 1, guard 2, king) and mana regenerates.

use std::fmt;

use thiserror::Error;
use tracing::{debug, info};

use crate::error::{CommandError, CommandResult};
use crate::game::{
    Command, CritSource, Event, HEAL_AMOUNT, Lane, Outcome, Placement, Player, PlayerId, STARTING_MANA,
    Special, StatProvider, Troop, TroopId, heal_weakest, invariants, opponent, resolve_lane,
    settle, validate_summon,
};
use crate::store::PlayerStore;

/// Seats in a match.
pub const SEATS: usize = 2;

/// Errors while assembling a match.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LobbyError {
    /// Both seats are taken.
    #[error("the lobby is full")]
    Full,
    /// The same username tried to take both seats.
    #[error("player `{0}` is already in the lobby")]
    DuplicatePlayer(String),
    /// `start` was called before both seats were filled.
    #[error("waiting for players ({0}/2 joined)")]
    NotReady(usize),
}

/// A player waiting for a match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entrant {
    /// Login name.
    pub username: String,
    /// Stored experience.
    pub experience: u32,
}

/// Collects two authenticated players and starts the session.
#[derive(Debug, Clone)]
pub struct Lobby {
    entrants: Vec<Entrant>,
    starting_mana: u32,
}

impl Default for Lobby {
    fn default() -> Self {
        Self::new()
    }
}

impl Lobby {
    /// Empty lobby with the standard starting mana.
    #[must_use]
    pub fn new() -> Self {
        Self::with_starting_mana(STARTING_MANA)
    }

    /// Empty lobby with custom starting mana.
    #[must_use]
    pub fn with_starting_mana(starting_mana: u32) -> Self {
        Self {
            entrants: Vec::with_capacity(SEATS),
            starting_mana,
        }
    }

    /// Seat a player. Seats are handed out in join order.
    ///
    /// # Errors
    ///
    /// [`LobbyError::Full`] when both seats are taken and
    /// [`LobbyError::DuplicatePlayer`] when the username is already seated.
    pub fn join(&mut self, username: impl Into<String>, experience: u32) -> Result<PlayerId, LobbyError> {
        let username = username.into();
        if self.entrants.len() >= SEATS {
            return Err(LobbyError::Full);
        }
        if self.contains(&username) {
            return Err(LobbyError::DuplicatePlayer(username));
        }
        let seat = self.entrants.len();
        info!(%username, seat, experience, "player joined lobby");
        self.entrants.push(Entrant {
            username,
            experience,
        });
        Ok(seat)
    }

    /// Whether `username` already holds a seat.
    #[must_use]
    pub fn contains(&self, username: &str) -> bool {
        self.entrants.iter().any(|e| e.username == username)
    }

    /// Both seats are taken.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.entrants.len() == SEATS
    }

    /// Seated players, in seat order.
    #[must_use]
    pub fn entrants(&self) -> &[Entrant] {
        &self.entrants
    }

    /// Build players with level-scaled towers and open the session.
    ///
    /// # Errors
    ///
    /// [`LobbyError::NotReady`] unless both seats are taken.
    pub fn start(
        self,
        stats: impl StatProvider + 'static,
        crits: impl CritSource + 'static,
    ) -> Result<Session, LobbyError> {
        let mana = self.starting_mana;
        let [first, second] = <[Entrant; SEATS]>::try_from(self.entrants)
            .map_err(|entrants| LobbyError::NotReady(entrants.len()))?;

        let towers = stats.towers();
        let players = [
            Player::new(0, first.username, first.experience, &towers, mana),
            Player::new(1, second.username, second.experience, &towers, mana),
        ];
        Ok(Session::new(players, Box::new(stats), Box::new(crits)))
    }
}

/// What a successful submission produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Submission {
    /// Notifications, in order.
    pub events: Vec<Event>,
    /// The submission completed a round and the lanes were resolved.
    pub round_resolved: bool,
    /// The round ended the match.
    pub outcome: Option<Outcome>,
}

/// One running match.
pub struct Session {
    players: [Player; SEATS],
    current_turn: PlayerId,
    pending: [Option<Command>; SEATS],
    rounds: u32,
    next_troop: u64,
    outcome: Option<Outcome>,
    settled: bool,
    stats: Box<dyn StatProvider>,
    crits: Box<dyn CritSource>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("players", &self.players)
            .field("current_turn", &self.current_turn)
            .field("pending", &self.pending)
            .field("rounds", &self.rounds)
            .field("outcome", &self.outcome)
            .field("settled", &self.settled)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Open a session for two ready players. Seat 0 moves first.
    #[must_use]
    pub fn new(
        players: [Player; SEATS],
        stats: Box<dyn StatProvider>,
        crits: Box<dyn CritSource>,
    ) -> Self {
        info!(
            first = %players[0].username,
            second = %players[1].username,
            "session started"
        );
        Self {
            players,
            current_turn: 0,
            pending: [None, None],
            rounds: 0,
            next_troop: 0,
            outcome: None,
            settled: false,
            stats,
            crits,
        }
    }

    /// The opening notice for both players.
    #[must_use]
    pub fn opening_events(&self) -> Vec<Event> {
        vec![Event::MatchStarted {
            players: self.players.clone().map(|p| p.username),
        }]
    }

    /// Both players.
    #[must_use]
    pub const fn players(&self) -> &[Player; SEATS] {
        &self.players
    }

    /// One player by seat.
    #[must_use]
    pub fn player(&self, id: PlayerId) -> &Player {
        &self.players[id]
    }

    /// Seat whose command is awaited.
    #[must_use]
    pub const fn current_turn(&self) -> PlayerId {
        self.current_turn
    }

    /// Number of fully resolved rounds.
    #[must_use]
    pub const fn rounds(&self) -> u32 {
        self.rounds
    }

    /// The command `player` committed this round, if any.
    #[must_use]
    pub fn pending(&self, player: PlayerId) -> Option<&Command> {
        self.pending[player].as_ref()
    }

    /// The decided result, once a king has fallen.
    #[must_use]
    pub const fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// A king tower has fallen.
    #[must_use]
    pub const fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    /// Handle one line of input from `player`.
    ///
    /// On error nothing changes and the same player keeps the turn.
    ///
    /// # Errors
    ///
    /// Turn-order, parse and rule rejections; see [`CommandError`].
    pub fn submit(&mut self, player: PlayerId, input: &str) -> CommandResult<Submission> {
        self.check_turn(player)?;
        let command = Command::parse(input)?;

        let mut events = Vec::new();
        match &command {
            Command::End => {
                events.push(Event::TurnEnded {
                    player: self.players[player].username.clone(),
                });
            }
            Command::Summon(order) => {
                let placement = validate_summon(
                    order,
                    self.stats.as_ref(),
                    &self.players[player],
                    &self.players[opponent(player)],
                )?;
                self.place(player, placement, &mut events);
            }
        }
        Ok(self.commit(player, command, events))
    }

    /// Commit `end` for a player whose turn deadline expired.
    ///
    /// # Errors
    ///
    /// [`CommandError::NotYourTurn`] if `player` does not hold the turn and
    /// [`CommandError::GameOver`] once the match is decided.
    pub fn time_out(&mut self, player: PlayerId) -> CommandResult<Submission> {
        self.check_turn(player)?;
        info!(player = %self.players[player].username, "turn deadline expired");
        let events = vec![Event::TurnTimedOut {
            player: self.players[player].username.clone(),
        }];
        Ok(self.commit(player, Command::End, events))
    }

    /// Award experience once the match is decided.
    ///
    /// Returns the reward and closing notices. Calling it again, or before
    /// the match ends, returns nothing.
    pub fn settle(&mut self, store: &dyn PlayerStore) -> Vec<Event> {
        match self.outcome {
            Some(outcome) if !self.settled => {
                self.settled = true;
                settle(outcome, &self.players, store)
            }
            _ => Vec::new(),
        }
    }

    fn check_turn(&self, player: PlayerId) -> CommandResult<()> {
        if self.outcome.is_some() {
            return Err(CommandError::GameOver);
        }
        if player != self.current_turn {
            return Err(CommandError::NotYourTurn);
        }
        Ok(())
    }

    fn place(&mut self, player: PlayerId, placement: Placement, events: &mut Vec<Event>) {
        let id = TroopId(self.next_troop);
        self.next_troop += 1;

        let owner = &mut self.players[player];
        let troop = Troop::summon(
            id,
            &placement.template,
            player,
            owner.level,
            placement.lane,
            placement.mode,
        );
        let paid = owner.spend_mana(troop.mana_cost);
        debug_assert!(paid, "mana was checked during validation");

        info!(
            player = %owner.username,
            troop = %troop.name,
            lane = %placement.lane,
            mode = %placement.mode,
            "summon"
        );
        events.push(Event::Summoned {
            player: owner.username.clone(),
            troop: troop.name.clone(),
            lane: placement.lane,
            mode: placement.mode,
            mana: owner.mana,
        });

        let heals = troop.special == Some(Special::Heal);
        owner.lane_mut(placement.lane).push(troop);

        if !heals {
            return;
        }
        if let Some((lane, hp)) = heal_weakest(owner.towers_mut()) {
            events.push(Event::TowerHealed {
                player: owner.username.clone(),
                lane,
                amount: HEAL_AMOUNT,
                hp,
            });
        }
    }

    fn commit(&mut self, player: PlayerId, command: Command, mut events: Vec<Event>) -> Submission {
        self.pending[player] = Some(command);
        self.current_turn = opponent(player);

        let mut submission = Submission::default();
        if self.pending.iter().all(Option::is_some) {
            submission.outcome = self.resolve_round(&mut events);
            submission.round_resolved = true;
        }
        submission.events = events;
        submission
    }

    fn resolve_round(&mut self, events: &mut Vec<Event>) -> Option<Outcome> {
        self.pending = [None, None];
        self.rounds += 1;
        debug!(round = self.rounds, "resolving round");

        let outcome = Lane::ALL
            .into_iter()
            .find_map(|lane| resolve_lane(&mut self.players, lane, self.crits.as_mut(), events));

        if let Some(outcome) = outcome {
            self.outcome = Some(outcome);
            let winner = self.players[outcome.winner].username.clone();
            let loser = self.players[outcome.loser].username.clone();
            info!(%winner, %loser, rounds = self.rounds, "king tower destroyed");
            events.push(Event::Victory { winner, loser });
            return Some(outcome);
        }

        events.push(Event::RoundResolved { round: self.rounds });
        for player in &mut self.players {
            let mana = player.regenerate_mana();
            events.push(Event::ManaRegenerated {
                player: player.id,
                mana,
            });
        }

        invariants::assert_invariants(self);
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::game::{FixedCrits, HasCombatStats, MAX_MANA, Mode};
    use crate::store::MemoryPlayerStore;

    fn session() -> Session {
        let mut lobby = Lobby::new();
        lobby.join("alice", 0).unwrap();
        lobby.join("bob", 0).unwrap();
        lobby
            .start(Catalog::builtin(), FixedCrits(false))
            .unwrap()
    }

    #[test]
    fn test_lobby_rejects_third_player() {
        let mut lobby = Lobby::new();
        assert_eq!(lobby.join("alice", 0), Ok(0));
        assert_eq!(lobby.join("bob", 0), Ok(1));
        assert_eq!(lobby.join("carol", 0), Err(LobbyError::Full));
    }

    #[test]
    fn test_lobby_rejects_duplicate() {
        let mut lobby = Lobby::new();
        lobby.join("alice", 0).unwrap();
        assert_eq!(
            lobby.join("alice", 0),
            Err(LobbyError::DuplicatePlayer("alice".into()))
        );
    }

    #[test]
    fn test_start_requires_two_players() {
        let mut lobby = Lobby::new();
        lobby.join("alice", 0).unwrap();
        let err = lobby.start(Catalog::builtin(), FixedCrits(false)).unwrap_err();
        assert_eq!(err, LobbyError::NotReady(1));
    }

    #[test]
    fn test_towers_scaled_by_level() {
        let mut lobby = Lobby::new();
        lobby.join("alice", 100).unwrap();
        lobby.join("bob", 0).unwrap();
        let session = lobby.start(Catalog::builtin(), FixedCrits(false)).unwrap();
        assert_eq!(session.player(0).tower(Lane::Guard1).hp(), 1100);
        assert_eq!(session.player(1).tower(Lane::Guard1).hp(), 1000);
    }

    #[test]
    fn test_turn_alternates_and_round_waits_for_both() {
        let mut s = session();
        assert_eq!(s.current_turn(), 0);
        assert_eq!(s.submit(1, "end"), Err(CommandError::NotYourTurn));

        let first = s.submit(0, "summon Pawn guard 1 attack").unwrap();
        assert!(!first.round_resolved);
        assert_eq!(s.current_turn(), 1);
        assert_eq!(s.player(0).mana, 2);
        assert_eq!(s.player(0).lane(Lane::Guard1).len(), 1);

        let second = s.submit(1, "end").unwrap();
        assert!(second.round_resolved);
        assert_eq!(s.rounds(), 1);
        assert_eq!(s.current_turn(), 0);
        assert!(s.pending(0).is_none());
        assert!(s.pending(1).is_none());
        assert_eq!(s.player(0).mana, 4);
        assert_eq!(s.player(1).mana, 7);
    }

    #[test]
    fn test_rejected_command_keeps_turn_and_state() {
        let mut s = session();
        assert_eq!(
            s.submit(0, "summon Prince guard 1 attack"),
            Err(CommandError::NotEnoughMana {
                required: 6,
                available: 5
            })
        );
        assert_eq!(s.current_turn(), 0);
        assert_eq!(s.player(0).mana, 5);
        assert!(s.player(0).lane(Lane::Guard1).is_empty());
        assert_eq!(s.submit(0, ""), Err(CommandError::Blank));
        assert_eq!(s.current_turn(), 0);
    }

    #[test]
    fn test_higher_level_pays_scaled_cost() {
        let mut lobby = Lobby::new();
        lobby.join("alice", 610).unwrap();
        lobby.join("bob", 0).unwrap();
        let mut s = lobby.start(Catalog::builtin(), FixedCrits(false)).unwrap();

        // Knight: base 5 is affordable, 5 x 1.5 = 7 is not.
        assert_eq!(
            s.submit(0, "summon Knight guard 1 attack"),
            Err(CommandError::NotEnoughMana {
                required: 7,
                available: 5
            })
        );
        assert_eq!(s.current_turn(), 0);
        assert_eq!(s.player(0).mana, 5);

        s.submit(0, "summon Pawn guard 1 attack").unwrap();
        assert_eq!(s.player(0).mana, 1);
        assert_eq!(s.player(0).lane(Lane::Guard1).front().unwrap().mana_cost, 4);
    }

    #[test]
    fn test_queen_heals_weakest_tower() {
        let mut s = session();
        s.players[0].tower_mut(Lane::Guard2).stats.hp = 400;
        let sub = s.submit(0, "summon queen guard 1 defend").unwrap();
        assert_eq!(s.player(0).tower(Lane::Guard2).hp(), 700);
        assert!(sub.events.iter().any(|e| matches!(
            e,
            Event::TowerHealed {
                lane: Lane::Guard2,
                hp: 700,
                ..
            }
        )));
        let queen = s.player(0).lane(Lane::Guard1).front().unwrap();
        assert_eq!(queen.mode, Mode::Defend);
    }

    #[test]
    fn test_mana_caps_at_max() {
        let mut s = session();
        for _ in 0..5 {
            s.submit(0, "end").unwrap();
            s.submit(1, "end").unwrap();
        }
        assert_eq!(s.player(0).mana, MAX_MANA);
        assert_eq!(s.player(1).mana, MAX_MANA);
    }

    #[test]
    fn test_time_out_commits_end() {
        let mut s = session();
        let sub = s.time_out(0).unwrap();
        assert_eq!(
            sub.events,
            vec![Event::TurnTimedOut {
                player: "alice".into()
            }]
        );
        assert_eq!(s.pending(0), Some(&Command::End));
        assert_eq!(s.current_turn(), 1);
        assert_eq!(s.time_out(0), Err(CommandError::NotYourTurn));
    }

    #[test]
    fn test_king_kill_ends_match_and_settles_once() {
        let mut s = session();
        for lane in [Lane::Guard1, Lane::Guard2] {
            s.players[1].mark_destroyed(lane);
            s.players[1].tower_mut(lane).stats.hp = 0;
        }
        s.players[1].tower_mut(Lane::King).stats = crate::game::CombatStats::new(10, 0, 0);

        s.submit(0, "summon Pawn king 1 attack").unwrap();
        let sub = s.submit(1, "end").unwrap();
        assert_eq!(sub.outcome, Some(Outcome { winner: 0, loser: 1 }));
        assert!(s.is_over());
        assert_eq!(s.submit(0, "end"), Err(CommandError::GameOver));

        let store = MemoryPlayerStore::new();
        store.insert("alice", "pw", 0);
        store.insert("bob", "pw", 0);
        let closing = s.settle(&store);
        assert_eq!(closing.last(), Some(&Event::MatchOver));
        assert_eq!(store.experience("alice").unwrap(), 30);
        assert_eq!(store.experience("bob").unwrap(), 10);
        assert!(s.settle(&store).is_empty());
        assert_eq!(store.experience("alice").unwrap(), 30);
    }
}
