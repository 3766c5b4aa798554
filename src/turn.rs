//! Turn state machine.
//!
//! [`Session`] is the single owner of the board and the turn state. It is
//! driven by three kinds of input: decoded peer messages, local commands
//! and transport loss. Each call returns a [`Reaction`] listing what to
//! send and what to tell the presentation layer, in order. Inputs that are
//! not legal in the current state change nothing.

use crate::error::SessionError;
use crate::presentation::{Command, Notification};
use crate::protocol::{DecodeError, Inbound, Outbound, Role};
use connectn_board::{Board, PlaceError, PlayerColor};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// How a game ended, from the local point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// We completed a run.
    #[display("won")]
    Won,
    /// The opponent completed a run or declared the game over.
    #[display("lost")]
    Lost,
    /// The connection ended before the game did.
    #[display("disconnected")]
    Disconnected,
}

/// Where the local side is in the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum TurnState {
    /// Color proposed, waiting for the peer to accept or reject it.
    #[display("negotiating color")]
    NegotiatingColor,
    /// Color accepted, waiting for `ROLE`.
    #[display("awaiting role")]
    AwaitingRole,
    /// Opponent's turn.
    #[display("waiting for opponent")]
    WaitingForOpponent,
    /// Our turn, no piece placed yet.
    #[display("my turn")]
    MyTurnOpen,
    /// Our turn, piece placed, end turn pending.
    #[display("my turn (placed)")]
    MyTurnPlaced,
    /// Terminal.
    #[display("game over ({})", _0)]
    GameOver(Outcome),
}

impl TurnState {
    /// Returns true if a local placement would be accepted.
    pub fn can_place(self) -> bool {
        matches!(self, TurnState::MyTurnOpen)
    }

    /// Returns true once the game has ended.
    pub fn is_terminal(self) -> bool {
        matches!(self, TurnState::GameOver(_))
    }
}

/// Why a local command was refused.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum IllegalMove {
    /// The board refused the piece.
    #[display("{}", _0)]
    Board(PlaceError),

    /// It is not our turn.
    #[display("Not your turn ({})", _0)]
    NotYourTurn(TurnState),

    /// A piece was already placed this turn.
    #[display("Already placed a piece this turn")]
    AlreadyPlaced,

    /// End turn requested before placing.
    #[display("Place a piece before ending the turn")]
    NothingPlaced,

    /// The game is over.
    #[display("Game is already over ({})", _0)]
    GameOver(Outcome),
}

impl std::error::Error for IllegalMove {}

impl From<PlaceError> for IllegalMove {
    fn from(err: PlaceError) -> Self {
        IllegalMove::Board(err)
    }
}

/// Effects of one input, in the order they must be applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reaction {
    /// Lines to send to the peer.
    pub outbound: Vec<Outbound>,
    /// Notifications for the presentation layer.
    pub notifications: Vec<Notification>,
}

impl Reaction {
    /// Returns true if the input had no visible effect.
    pub fn is_empty(&self) -> bool {
        self.outbound.is_empty() && self.notifications.is_empty()
    }

    fn send(&mut self, message: Outbound) {
        self.outbound.push(message);
    }

    fn notify(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }

    fn discard(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        warn!(%reason, "Discarding inbound message");
        self.notify(Notification::InputDiscarded { reason });
    }
}

/// Color given to opponent pieces when the peer never announced one.
fn fallback_opponent_color(local: &PlayerColor) -> PlayerColor {
    let fallback = PlayerColor::new("opponent");
    if &fallback == local {
        PlayerColor::new("other")
    } else {
        fallback
    }
}

/// The local game session: colors, role, turn state and board.
#[derive(Debug, Clone)]
pub struct Session {
    local_color: PlayerColor,
    opponent_color: Option<PlayerColor>,
    is_player1: Option<bool>,
    state: TurnState,
    board: Board,
}

impl Session {
    /// Creates a session in [`TurnState::NegotiatingColor`] with an empty board.
    #[instrument(skip(board), fields(rows = board.rows(), columns = board.columns()))]
    pub fn new(local_color: PlayerColor, board: Board) -> Self {
        Self {
            local_color,
            opponent_color: None,
            is_player1: None,
            state: TurnState::NegotiatingColor,
            board,
        }
    }

    /// Our color.
    pub fn local_color(&self) -> &PlayerColor {
        &self.local_color
    }

    /// Opponent color, once known.
    pub fn opponent_color(&self) -> Option<&PlayerColor> {
        self.opponent_color.as_ref()
    }

    /// Whether we move first, once the role is assigned.
    pub fn is_player1(&self) -> Option<bool> {
        self.is_player1
    }

    /// Run length needed to win.
    pub fn win_length(&self) -> usize {
        self.board.win_length()
    }

    /// Current turn state.
    pub fn state(&self) -> TurnState {
        self.state
    }

    /// The board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The opening color proposal.
    pub fn announce(&self) -> Reaction {
        Reaction {
            outbound: vec![Outbound::Color(self.local_color.clone())],
            notifications: Vec::new(),
        }
    }

    /// Applies one decoded peer message.
    ///
    /// Only a color rejection is fatal. Everything else either advances the
    /// state or is reported and dropped.
    #[instrument(skip(self), fields(state = %self.state))]
    pub fn handle_inbound(&mut self, message: Inbound) -> Result<Reaction, SessionError> {
        let mut reaction = Reaction::default();

        if self.state.is_terminal() {
            debug!(?message, "Ignoring message after game over");
            return Ok(reaction);
        }

        use TurnState::*;
        match (self.state, message) {
            (_, Inbound::Color(color)) => self.learn_opponent_color(color, &mut reaction),

            (NegotiatingColor, Inbound::ColorAccepted) => {
                info!(color = %self.local_color, "Color accepted");
                self.transition(AwaitingRole, &mut reaction);
            }
            (NegotiatingColor, Inbound::ColorRejected(reason)) => {
                warn!(%reason, "Color rejected");
                return Err(SessionError::ColorRejected { reason });
            }
            (NegotiatingColor, Inbound::SendColor) => {
                debug!("Peer asked for our color again");
                reaction.send(Outbound::Color(self.local_color.clone()));
            }

            (AwaitingRole, Inbound::Role(role)) => {
                let first = role == Role::Player1;
                info!(%role, "Role assigned");
                self.is_player1 = Some(first);
                let next = if first { MyTurnOpen } else { WaitingForOpponent };
                self.transition(next, &mut reaction);
            }

            (WaitingForOpponent, Inbound::Move(column)) => {
                self.apply_opponent_move(column, &mut reaction)
            }
            (MyTurnOpen | MyTurnPlaced, Inbound::Move(column)) => {
                reaction.discard(format!("opponent MOVE {column} during our turn"));
            }

            (WaitingForOpponent | MyTurnOpen, Inbound::YourTurn) => {
                self.transition(MyTurnOpen, &mut reaction);
            }
            (MyTurnPlaced, Inbound::YourTurn) => {
                reaction.discard("YOUR_TURN before our END_TURN; one piece per turn");
            }

            (WaitingForOpponent, Inbound::Wait) => {}
            (MyTurnOpen | MyTurnPlaced, Inbound::Wait) => {
                self.transition(WaitingForOpponent, &mut reaction);
            }

            (WaitingForOpponent | MyTurnOpen | MyTurnPlaced, Inbound::GameOver) => {
                info!("Peer declared the game over");
                self.finish(Outcome::Lost, &mut reaction);
            }

            (state, message) => {
                reaction.discard(format!("{message:?} is not expected while {state}"));
            }
        }

        Ok(reaction)
    }

    /// Reports a line that could not be decoded. Nothing changes.
    pub fn handle_decode_error(&self, line: &str, err: &DecodeError) -> Reaction {
        let mut reaction = Reaction::default();
        reaction.discard(format!("{err} (line {line:?})"));
        reaction
    }

    /// Applies one local command.
    ///
    /// Commands that are not legal now produce a rejection notification and
    /// nothing else.
    #[instrument(skip(self), fields(state = %self.state))]
    pub fn handle_command(&mut self, command: Command) -> Reaction {
        let mut reaction = Reaction::default();
        match command {
            Command::RequestPlacement { column } => {
                if let Err(err) = self.place_local(column, &mut reaction) {
                    warn!(column, %err, "Placement rejected");
                    reaction.notify(Notification::PlacementRejected {
                        reason: err.to_string(),
                    });
                }
            }
            Command::RequestEndTurn => {
                if let Err(err) = self.end_turn(&mut reaction) {
                    warn!(%err, "End turn rejected");
                    reaction.notify(Notification::EndTurnRejected {
                        reason: err.to_string(),
                    });
                }
            }
        }
        reaction
    }

    /// Records the loss of the transport.
    ///
    /// A finished game keeps its outcome; anything else ends as
    /// [`Outcome::Disconnected`].
    #[instrument(skip(self), fields(state = %self.state))]
    pub fn handle_disconnect(&mut self, reason: &str) -> Reaction {
        let mut reaction = Reaction::default();
        if self.state.is_terminal() {
            debug!("Transport closed after game over");
            return reaction;
        }
        warn!(%reason, "Transport lost mid-game");
        self.finish(Outcome::Disconnected, &mut reaction);
        reaction
    }

    fn place_local(&mut self, column: usize, reaction: &mut Reaction) -> Result<(), IllegalMove> {
        match self.state {
            TurnState::MyTurnOpen => {}
            TurnState::MyTurnPlaced => return Err(IllegalMove::AlreadyPlaced),
            TurnState::GameOver(outcome) => return Err(IllegalMove::GameOver(outcome)),
            other => return Err(IllegalMove::NotYourTurn(other)),
        }

        let color = self.local_color.clone();
        let row = self.board.place_piece(column, &color)?;
        reaction.notify(Notification::CellFilled {
            row,
            column,
            color: color.clone(),
        });
        reaction.send(Outbound::Move(column));

        if self.board.check_win(row, column, &color) {
            info!(row, column, "Winning placement");
            reaction.send(Outbound::GameOver);
            self.finish(Outcome::Won, reaction);
        } else {
            self.transition(TurnState::MyTurnPlaced, reaction);
        }
        Ok(())
    }

    fn end_turn(&mut self, reaction: &mut Reaction) -> Result<(), IllegalMove> {
        match self.state {
            TurnState::MyTurnPlaced => {
                reaction.send(Outbound::EndTurn);
                self.transition(TurnState::WaitingForOpponent, reaction);
                Ok(())
            }
            TurnState::MyTurnOpen => Err(IllegalMove::NothingPlaced),
            TurnState::GameOver(outcome) => Err(IllegalMove::GameOver(outcome)),
            other => Err(IllegalMove::NotYourTurn(other)),
        }
    }

    fn apply_opponent_move(&mut self, column: usize, reaction: &mut Reaction) {
        if column >= self.board.columns() {
            reaction.discard(format!(
                "MOVE {column} out of range (board has {} columns)",
                self.board.columns()
            ));
            return;
        }

        let color = match &self.opponent_color {
            Some(color) => color.clone(),
            None => {
                let fallback = fallback_opponent_color(&self.local_color);
                warn!(%fallback, "Opponent moved before announcing a color");
                self.assign_opponent_color(fallback.clone(), reaction);
                fallback
            }
        };

        match self.board.place_piece(column, &color) {
            Ok(row) => {
                reaction.notify(Notification::CellFilled {
                    row,
                    column,
                    color: color.clone(),
                });
                if self.board.check_win(row, column, &color) {
                    info!(row, column, "Opponent completed a run");
                    self.finish(Outcome::Lost, reaction);
                }
            }
            Err(err) => reaction.discard(format!("opponent MOVE rejected: {err}")),
        }
    }

    fn learn_opponent_color(&mut self, color: PlayerColor, reaction: &mut Reaction) {
        if color == self.local_color {
            debug!(%color, "Peer echoed our color");
            return;
        }
        match &self.opponent_color {
            None => self.assign_opponent_color(color, reaction),
            Some(known) if *known == color => {}
            Some(known) => {
                reaction.discard(format!("opponent color already {known}, ignoring {color}"));
            }
        }
    }

    fn assign_opponent_color(&mut self, color: PlayerColor, reaction: &mut Reaction) {
        info!(local = %self.local_color, opponent = %color, "Opponent color learned");
        self.opponent_color = Some(color.clone());
        reaction.notify(Notification::ColorAssigned {
            local: self.local_color.clone(),
            opponent: color,
        });
    }

    fn transition(&mut self, next: TurnState, reaction: &mut Reaction) {
        let could_place = self.state.can_place();
        debug!(from = %self.state, to = %next, "Turn state transition");
        self.state = next;
        if next.can_place() != could_place {
            reaction.notify(Notification::TurnChanged {
                can_place: next.can_place(),
            });
        }
    }

    fn finish(&mut self, outcome: Outcome, reaction: &mut Reaction) {
        info!(%outcome, "Game over");
        self.transition(TurnState::GameOver(outcome), reaction);
        reaction.notify(Notification::GameEnded { outcome });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new(PlayerColor::new("red"), Board::default())
    }

    fn in_game(role: Role) -> Session {
        let mut s = session();
        s.handle_inbound(Inbound::ColorAccepted).unwrap();
        s.handle_inbound(Inbound::Role(role)).unwrap();
        s
    }

    #[test]
    fn test_send_color_resends_proposal() {
        let mut s = session();
        let reaction = s.handle_inbound(Inbound::SendColor).unwrap();
        assert_eq!(reaction.outbound, vec![Outbound::Color(PlayerColor::new("red"))]);
        assert_eq!(s.state(), TurnState::NegotiatingColor);
    }

    #[test]
    fn test_rejection_is_fatal() {
        let mut s = session();
        let err = s
            .handle_inbound(Inbound::ColorRejected("taken".into()))
            .unwrap_err();
        assert!(matches!(err, SessionError::ColorRejected { reason } if reason == "taken"));
    }

    #[test]
    fn test_role_decides_first_turn() {
        let first = in_game(Role::Player1);
        assert_eq!(first.state(), TurnState::MyTurnOpen);
        assert_eq!(first.is_player1(), Some(true));

        let second = in_game(Role::Player2);
        assert_eq!(second.state(), TurnState::WaitingForOpponent);
        assert_eq!(second.is_player1(), Some(false));
    }

    #[test]
    fn test_turn_changed_only_on_change() {
        let mut s = session();
        s.handle_inbound(Inbound::ColorAccepted).unwrap();
        let reaction = s.handle_inbound(Inbound::Role(Role::Player2)).unwrap();
        assert!(reaction.notifications.is_empty());

        let reaction = s.handle_inbound(Inbound::YourTurn).unwrap();
        assert_eq!(
            reaction.notifications,
            vec![Notification::TurnChanged { can_place: true }]
        );
    }

    #[test]
    fn test_own_color_echo_is_ignored() {
        let mut s = session();
        let reaction = s.handle_inbound(Inbound::Color(PlayerColor::new("RED"))).unwrap();
        assert!(reaction.is_empty());
        assert_eq!(s.opponent_color(), None);
    }

    #[test]
    fn test_opponent_color_is_learned_once() {
        let mut s = session();
        let reaction = s
            .handle_inbound(Inbound::Color(PlayerColor::new("yellow")))
            .unwrap();
        assert_eq!(
            reaction.notifications,
            vec![Notification::ColorAssigned {
                local: PlayerColor::new("red"),
                opponent: PlayerColor::new("yellow"),
            }]
        );

        let reaction = s.handle_inbound(Inbound::Color(PlayerColor::new("blue"))).unwrap();
        assert!(matches!(
            reaction.notifications.as_slice(),
            [Notification::InputDiscarded { .. }]
        ));
        assert_eq!(s.opponent_color(), Some(&PlayerColor::new("yellow")));
    }

    #[test]
    fn test_unannounced_opponent_gets_fallback_color() {
        let mut s = in_game(Role::Player2);
        let reaction = s.handle_inbound(Inbound::Move(0)).unwrap();
        assert_eq!(s.opponent_color(), Some(&PlayerColor::new("opponent")));
        assert!(reaction.notifications.contains(&Notification::CellFilled {
            row: 5,
            column: 0,
            color: PlayerColor::new("opponent"),
        }));
    }

    #[test]
    fn test_end_turn_before_placing_is_rejected() {
        let mut s = in_game(Role::Player1);
        let reaction = s.handle_command(Command::RequestEndTurn);
        assert!(reaction.outbound.is_empty());
        assert!(matches!(
            reaction.notifications.as_slice(),
            [Notification::EndTurnRejected { .. }]
        ));
        assert_eq!(s.state(), TurnState::MyTurnOpen);
    }

    #[test]
    fn test_wait_takes_turn_back() {
        let mut s = in_game(Role::Player1);
        let reaction = s.handle_inbound(Inbound::Wait).unwrap();
        assert_eq!(s.state(), TurnState::WaitingForOpponent);
        assert_eq!(
            reaction.notifications,
            vec![Notification::TurnChanged { can_place: false }]
        );
    }

    #[test]
    fn test_your_turn_after_placing_does_not_reopen() {
        let mut s = in_game(Role::Player1);
        s.handle_command(Command::RequestPlacement { column: 0 });
        s.handle_inbound(Inbound::YourTurn).unwrap();
        assert_eq!(s.state(), TurnState::MyTurnPlaced);
    }

    #[test]
    fn test_disconnect_mid_game() {
        let mut s = in_game(Role::Player2);
        let reaction = s.handle_disconnect("eof");
        assert_eq!(s.state(), TurnState::GameOver(Outcome::Disconnected));
        assert_eq!(
            reaction.notifications,
            vec![Notification::GameEnded {
                outcome: Outcome::Disconnected
            }]
        );
    }

    #[test]
    fn test_disconnect_after_win_keeps_outcome() {
        let mut s = in_game(Role::Player2);
        s.handle_inbound(Inbound::GameOver).unwrap();
        assert!(s.handle_disconnect("eof").is_empty());
        assert_eq!(s.state(), TurnState::GameOver(Outcome::Lost));
    }
}
