use bigtwo::{
    ClientCommand, ClientError, GameClient, Presenter, Seat, ServerEvent, Session, Transport,
};
use std::env;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpStream;
use std::process::exit;
use std::sync::mpsc::{self, Sender};
use std::thread;
use std::time::Duration;

/// Everything the consumer loop can receive. Server events and user
/// commands funnel through one queue, so state changes never interleave.
enum Input {
    Event(ServerEvent),
    Command(String),
    Lost,
}

struct Terminal;

impl Presenter for Terminal {
    fn line(&mut self, message: &str) {
        println!("{message}");
    }

    fn chat(&mut self, message: &str) {
        println!("[chat] {message}");
    }

    fn refresh(&mut self, session: &Session, local_seat: Option<Seat>) {
        if let Some(seat) = local_seat {
            let cards = session.player(seat).cards();
            if !cards.is_empty() {
                let listing = cards
                    .iter()
                    .enumerate()
                    .map(|(index, card)| format!("{index}:{card}"))
                    .collect::<Vec<_>>()
                    .join(" ");
                println!("hand: {listing}");
            }
        }
    }
}

/// Line-delimited JSON over TCP. The stream is replaced on reconnect.
struct JsonLink {
    stream: Option<TcpStream>,
}

impl JsonLink {
    fn attach(&mut self, stream: TcpStream) {
        self.stream = Some(stream);
    }
}

impl Transport for JsonLink {
    fn send(&mut self, command: ClientCommand) -> Result<(), ClientError> {
        let stream = self.stream.as_mut().ok_or(ClientError::ConnectionLost)?;
        let mut line = serde_json::to_vec(&command).map_err(|_| ClientError::ConnectionLost)?;
        line.push(b'\n');
        stream
            .write_all(&line)
            .map_err(|_| ClientError::ConnectionLost)
    }
}

fn read_events(stream: TcpStream, inputs: Sender<Input>) {
    let reader = BufReader::new(stream);
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(_) => break,
        };
        match serde_json::from_str::<ServerEvent>(&line) {
            Ok(event) => {
                if inputs.send(Input::Event(event)).is_err() {
                    return;
                }
            }
            Err(err) => log::warn!("undecodable server message: {err}"),
        }
    }
    let _ = inputs.send(Input::Lost);
}

fn read_commands(inputs: Sender<Input>) {
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        match line {
            Ok(line) => {
                if inputs.send(Input::Command(line)).is_err() {
                    return;
                }
            }
            Err(_) => return,
        }
    }
}

/// Runs one user command; returns false when the user wants out.
fn run_command<T: Transport, P: Presenter>(client: &mut GameClient<T, P>, line: &str) -> bool {
    let mut words = line.split_whitespace();
    let result = match words.next() {
        Some("play") => match words.map(str::parse).collect::<Result<Vec<usize>, _>>() {
            Ok(indices) if !indices.is_empty() => client.submit_move(&indices),
            _ => {
                println!("usage: play <card index> [card index ...]");
                return true;
            }
        },
        Some("pass") => client.submit_pass(),
        Some("say") => client.submit_chat(&words.collect::<Vec<_>>().join(" ")),
        Some("ready") => client.submit_ready(),
        Some("hand") => {
            match client.seat() {
                Some(seat) => {
                    for (index, card) in client.session().player(seat).cards().iter().enumerate() {
                        println!("{index}: {card}");
                    }
                }
                None => println!("not seated yet"),
            }
            Ok(())
        }
        Some("quit") | Some("exit") => return false,
        Some(other) => {
            println!("unknown command: {other} (try play/pass/say/ready/hand/quit)");
            Ok(())
        }
        None => Ok(()),
    };
    if let Err(err) = result {
        println!("{err}");
    }
    true
}

fn main() {
    env_logger::init();

    let mut args = env::args().skip(1);
    let (addr, name) = match (args.next(), args.next()) {
        (Some(addr), Some(name)) => (addr, name),
        _ => {
            eprintln!("usage: bigtwo-cli <server-addr> <name>");
            exit(2);
        }
    };

    // a client that cannot connect at all has nothing to do
    let stream = match TcpStream::connect(&addr) {
        Ok(stream) => stream,
        Err(err) => {
            eprintln!("cannot connect to {addr}: {err}");
            exit(1);
        }
    };

    let (inputs, queue) = mpsc::channel();
    let commands = inputs.clone();
    thread::spawn(move || read_commands(commands));

    let mut client = GameClient::new(JsonLink { stream: None }, Terminal);
    let mut next_stream = Some(stream);

    loop {
        let stream = next_stream.take().unwrap();
        let events = inputs.clone();
        match stream.try_clone() {
            Ok(reading_half) => {
                thread::spawn(move || read_events(reading_half, events));
            }
            Err(err) => {
                eprintln!("cannot split the connection: {err}");
                exit(1);
            }
        }
        client.transport_mut().attach(stream);

        let mut lost = client.reconnected(&name).is_err();
        if lost {
            client.connection_lost();
        }

        while !lost {
            match queue.recv() {
                Ok(Input::Event(event)) => {
                    if let Err(err) = client.handle(event) {
                        println!("{err}");
                    }
                    if !client.is_usable() {
                        // the table refused us; nothing left to wait for
                        return;
                    }
                }
                Ok(Input::Command(line)) => {
                    if !run_command(&mut client, &line) {
                        return;
                    }
                }
                Ok(Input::Lost) => {
                    client.connection_lost();
                    lost = true;
                }
                Err(_) => return,
            }
        }

        // retry until the server is back; the server decides when we may
        // rejoin the table
        next_stream = Some(loop {
            match TcpStream::connect(&addr) {
                Ok(stream) => break stream,
                Err(err) => {
                    log::info!("reconnect to {addr} failed: {err}");
                    thread::sleep(Duration::from_secs(3));
                }
            }
        });
    }
}
