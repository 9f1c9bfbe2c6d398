use crate::message::{ClientCommand, ServerEvent};
use crate::seat::Seat;
use crate::session::{Applied, GameError, Phase, Session};
use log::{info, warn};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("the connection to the server was lost")]
    ConnectionLost,
    #[error("the table is full")]
    TableFull,
    #[error("no seat has been assigned yet")]
    NotSeated,
    #[error(transparent)]
    Game(#[from] GameError),
}

/// Outbound half of the transport boundary. Implementations own the bytes;
/// the client only hands over typed commands.
pub trait Transport {
    fn send(&mut self, command: ClientCommand) -> Result<(), ClientError>;
}

/// The presentation collaborator. The client pushes status and chat lines
/// as they happen and a refresh after every state change; what any of it
/// looks like is not its concern.
pub trait Presenter {
    fn line(&mut self, message: &str);
    fn chat(&mut self, message: &str);
    fn refresh(&mut self, session: &Session, local_seat: Option<Seat>);
}

/// The local player's mirror of the authoritative game. Inbound events
/// must be fed to [`GameClient::handle`] one at a time in arrival order;
/// every rebroadcast move is re-validated against the mirrored state, so
/// the local view stays deterministic even if the server misbehaves.
pub struct GameClient<T, P> {
    session: Session,
    seat: Option<Seat>,
    occupied: usize,
    usable: bool,
    transport: T,
    presenter: P,
}

impl<T: Transport, P: Presenter> GameClient<T, P> {
    pub fn new(transport: T, presenter: P) -> Self {
        Self {
            session: Session::new(),
            seat: None,
            occupied: 0,
            usable: true,
            transport,
            presenter,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The local player's seat, once the server has assigned one.
    pub fn seat(&self) -> Option<Seat> {
        self.seat
    }

    pub fn occupied(&self) -> usize {
        self.occupied
    }

    /// False once the server refused us or the connection died.
    pub fn is_usable(&self) -> bool {
        self.usable
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    /// The connect handshake: announce a name, then report ready.
    pub fn announce(&mut self, name: &str) -> Result<(), ClientError> {
        self.transport.send(ClientCommand::Join {
            name: name.to_owned(),
        })?;
        self.transport.send(ClientCommand::Ready)
    }

    /// Proposes a play of the given hand indices. The move is checked
    /// against the mirrored state first, but nothing mutates here: state
    /// advances when the server rebroadcasts the accepted move.
    pub fn submit_move(&mut self, indices: &[usize]) -> Result<(), ClientError> {
        let seat = self.seat.ok_or(ClientError::NotSeated)?;
        self.session.validate(seat, indices)?;
        self.transport.send(ClientCommand::Move {
            indices: indices.to_vec(),
        })
    }

    pub fn submit_pass(&mut self) -> Result<(), ClientError> {
        self.submit_move(&[])
    }

    pub fn submit_chat(&mut self, text: &str) -> Result<(), ClientError> {
        self.transport.send(ClientCommand::Chat {
            text: text.to_owned(),
        })
    }

    pub fn submit_ready(&mut self) -> Result<(), ClientError> {
        self.transport.send(ClientCommand::Ready)
    }

    /// The transport died: discard the round and wait to be re-seated.
    /// Any in-flight move is gone; the player resubmits after reconnecting.
    pub fn connection_lost(&mut self) {
        warn!("connection lost, discarding the round");
        self.seat = None;
        self.occupied = 0;
        self.usable = false;
        self.session.reset();
        self.presenter.line("Lost connection to the server.");
    }

    /// Call once a replacement connection is up; redoes the handshake.
    pub fn reconnected(&mut self, name: &str) -> Result<(), ClientError> {
        self.usable = true;
        self.announce(name)
    }

    /// Applies one inbound server event to the mirrored state.
    pub fn handle(&mut self, event: ServerEvent) -> Result<(), ClientError> {
        match event {
            ServerEvent::PlayerList { seat, names } => {
                self.seat = Some(seat);
                self.occupied = names.iter().filter(|name| name.is_some()).count();
                for (index, name) in names.into_iter().enumerate() {
                    if let Ok(seat) = Seat::try_from(index) {
                        self.session.set_name(seat, name);
                    }
                }
                info!("assigned seat {seat}, {} seats occupied", self.occupied);
                self.presenter
                    .line(&format!("Connected, sitting at seat {seat}."));
            }
            ServerEvent::Join { seat, name } => {
                self.presenter
                    .line(&format!("{name} joined at seat {seat}."));
                self.session.set_name(seat, Some(name));
                self.occupied += 1;
            }
            ServerEvent::Full => {
                self.usable = false;
                self.presenter.line("The table is full, cannot join.");
            }
            ServerEvent::Quit { seat } => {
                let name = self
                    .session
                    .player(seat)
                    .name()
                    .unwrap_or("a player")
                    .to_owned();
                self.presenter.line(&format!("{name} left seat {seat}."));
                self.session.set_name(seat, None);
                self.occupied = self.occupied.saturating_sub(1);
                // a four-player round cannot continue around an empty seat
                if self.session.phase() == &Phase::InRound {
                    self.session.reset();
                    self.transport.send(ClientCommand::Ready)?;
                }
            }
            ServerEvent::Ready { seat } => {
                let name = self.session.player(seat).name().unwrap_or("?").to_owned();
                self.presenter
                    .line(&format!("Seat {seat} ({name}) is ready."));
            }
            ServerEvent::Start { deck } => {
                self.session.start(deck)?;
                self.presenter
                    .line("All players are ready, the round starts.");
                self.announce_turn();
            }
            ServerEvent::Move { seat, indices } => match self.session.apply(seat, &indices) {
                Ok(Applied::Passed) => {
                    self.presenter.line(&format!("Seat {seat} passes."));
                    self.announce_turn();
                }
                Ok(Applied::Played(hand)) => {
                    self.presenter.line(&format!("Seat {seat} plays {hand}."));
                    let winner = match self.session.phase() {
                        Phase::RoundEnded { winner } => Some(*winner),
                        _ => None,
                    };
                    if let Some(winner) = winner {
                        self.presenter
                            .line(&format!("Seat {winner} wins the round!"));
                        for (seat, left) in self.session.standings() {
                            if left > 0 {
                                self.presenter
                                    .line(&format!("Seat {seat} has {left} cards left."));
                            }
                        }
                    } else {
                        self.announce_turn();
                    }
                }
                Err(err) => {
                    // the mirror disagrees with the authority; local state
                    // stays put and the disagreement is logged
                    warn!("rejected rebroadcast move from seat {seat}: {err}");
                    self.presenter.line("Not a legal move!");
                }
            },
            ServerEvent::Chat { text } => self.presenter.chat(&text),
        }
        self.presenter.refresh(&self.session, self.seat);
        Ok(())
    }

    fn announce_turn(&mut self) {
        if let Some(turn) = self.session.current_turn() {
            self.presenter.line(&format!("Seat {turn}'s turn."));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{deck, OPENING_CARD};

    #[derive(Default)]
    struct Wire(Vec<ClientCommand>);

    impl Transport for Wire {
        fn send(&mut self, command: ClientCommand) -> Result<(), ClientError> {
            self.0.push(command);
            Ok(())
        }
    }

    #[derive(Default)]
    struct Quiet {
        lines: Vec<String>,
        chats: Vec<String>,
    }

    impl Presenter for Quiet {
        fn line(&mut self, message: &str) {
            self.lines.push(message.to_owned());
        }

        fn chat(&mut self, message: &str) {
            self.chats.push(message.to_owned());
        }

        fn refresh(&mut self, _session: &Session, _local_seat: Option<Seat>) {}
    }

    fn client() -> GameClient<Wire, Quiet> {
        GameClient::new(Wire::default(), Quiet::default())
    }

    fn seated_client() -> GameClient<Wire, Quiet> {
        let mut client = client();
        client
            .handle(ServerEvent::PlayerList {
                seat: Seat::A,
                names: [
                    Some("amy".to_owned()),
                    Some("ben".to_owned()),
                    Some("che".to_owned()),
                    Some("dee".to_owned()),
                ],
            })
            .unwrap();
        // the unshuffled deck puts the 3♦ with seat A
        client
            .handle(ServerEvent::Start { deck: deck() })
            .unwrap();
        client
    }

    #[test]
    fn test_player_list_assigns_the_local_seat() {
        let mut client = client();
        client
            .handle(ServerEvent::PlayerList {
                seat: Seat::B,
                names: [Some("amy".to_owned()), Some("ben".to_owned()), None, None],
            })
            .unwrap();

        assert_eq!(client.seat(), Some(Seat::B));
        assert_eq!(client.occupied(), 2);
        assert_eq!(client.session().player(Seat::A).name(), Some("amy"));
        assert_eq!(client.session().player(Seat::C).name(), None);
    }

    #[test]
    fn test_announce_sends_join_then_ready() {
        let mut client = client();
        client.announce("amy").unwrap();
        assert_eq!(
            client.transport().0,
            vec![
                ClientCommand::Join {
                    name: "amy".to_owned()
                },
                ClientCommand::Ready,
            ]
        );
    }

    #[test]
    fn test_join_and_quit_track_occupancy() {
        let mut client = client();
        client
            .handle(ServerEvent::Join {
                seat: Seat::C,
                name: "che".to_owned(),
            })
            .unwrap();
        assert_eq!(client.occupied(), 1);
        assert_eq!(client.session().player(Seat::C).name(), Some("che"));

        client.handle(ServerEvent::Quit { seat: Seat::C }).unwrap();
        assert_eq!(client.occupied(), 0);
        assert_eq!(client.session().player(Seat::C).name(), None);
        // no round was running, so no fresh READY went out
        assert!(client.transport().0.is_empty());
    }

    #[test]
    fn test_full_marks_the_client_unusable() {
        let mut client = client();
        client.handle(ServerEvent::Full).unwrap();
        assert!(!client.is_usable());
        assert!(client
            .presenter()
            .lines
            .iter()
            .any(|line| line.contains("full")));
    }

    #[test]
    fn test_start_deals_and_seats_the_opener() {
        let client = seated_client();
        assert_eq!(client.session().current_turn(), Some(Seat::A));
        assert_eq!(client.session().player(Seat::A).cards().len(), 13);
        assert!(client
            .session()
            .player(Seat::A)
            .cards()
            .contains(&OPENING_CARD));
    }

    #[test]
    fn test_quit_mid_round_resets_and_re_readies() {
        let mut client = seated_client();
        client.handle(ServerEvent::Quit { seat: Seat::D }).unwrap();

        assert_eq!(client.session().phase(), &Phase::Dealing);
        assert!(client.session().player(Seat::A).cards().is_empty());
        assert_eq!(client.transport().0.last(), Some(&ClientCommand::Ready));
    }

    #[test]
    fn test_submit_move_validates_locally_without_mutating() {
        let mut client = seated_client();

        // out-of-range selection never reaches the wire
        assert_eq!(
            client.submit_move(&[99]),
            Err(ClientError::Game(GameError::InvalidSelection))
        );
        assert!(client.transport().0.is_empty());

        let opener = client
            .session()
            .player(Seat::A)
            .cards()
            .iter()
            .position(|&card| card == OPENING_CARD)
            .unwrap();
        client.submit_move(&[opener]).unwrap();
        assert_eq!(
            client.transport().0.last(),
            Some(&ClientCommand::Move {
                indices: vec![opener]
            })
        );
        // state advances only on the server's rebroadcast
        assert_eq!(client.session().player(Seat::A).cards().len(), 13);

        client
            .handle(ServerEvent::Move {
                seat: Seat::A,
                indices: vec![opener],
            })
            .unwrap();
        assert_eq!(client.session().player(Seat::A).cards().len(), 12);
        assert_eq!(client.session().table().len(), 1);
    }

    #[test]
    fn test_rebroadcast_moves_are_revalidated() {
        let mut client = seated_client();

        // seat B is not the current seat; the mirror refuses to apply this
        client
            .handle(ServerEvent::Move {
                seat: Seat::B,
                indices: vec![0],
            })
            .unwrap();
        assert!(client.session().table().is_empty());
        assert_eq!(client.session().player(Seat::B).cards().len(), 13);
        assert!(client
            .presenter()
            .lines
            .iter()
            .any(|line| line.contains("Not a legal move")));
    }

    #[test]
    fn test_submitting_without_a_seat_fails() {
        let mut client = client();
        assert_eq!(client.submit_pass(), Err(ClientError::NotSeated));
    }

    #[test]
    fn test_chat_is_forwarded_verbatim() {
        let mut client = seated_client();
        client
            .handle(ServerEvent::Chat {
                text: "hello there".to_owned(),
            })
            .unwrap();
        assert_eq!(client.presenter().chats, vec!["hello there".to_owned()]);
        // chat never touches the game
        assert_eq!(client.session().player(Seat::A).cards().len(), 13);
    }

    #[test]
    fn test_connection_loss_resets_everything() {
        let mut client = seated_client();
        client.connection_lost();

        assert_eq!(client.seat(), None);
        assert!(!client.is_usable());
        assert_eq!(client.session().phase(), &Phase::Dealing);

        client.reconnected("amy").unwrap();
        assert!(client.is_usable());
        assert_eq!(client.transport().0.last(), Some(&ClientCommand::Ready));
    }
}
