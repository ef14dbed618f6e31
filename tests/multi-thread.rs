#![allow(unused_crate_dependencies)]

use std::io::{Read, Write};
use std::net::TcpStream;
use std::thread;
use std::time::{Duration, Instant};

mod support;

/// Holds a connection open on a worker by sending everything except
/// the terminating blank line.
fn open_held_connection(server: &localserve::Server) -> TcpStream {
    let mut client = support::create_client(server.server_addr(), Some(Duration::from_secs(10)));
    client.write_all(b"GET /hello.txt HTTP/1.1\r\n").unwrap();
    client
}

fn release(client: &mut TcpStream) -> String {
    client.write_all(b"\r\n").unwrap();

    let mut response = Vec::new();
    let _ = client.read_to_end(&mut response).unwrap();
    String::from_utf8(response).unwrap()
}

#[test]
fn test_concurrent_downloads_complete() {
    let (server, _root) = support::new_file_server();
    let addr = server.server_addr();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            thread::spawn(move || {
                let mut client = support::create_client(addr, Some(Duration::from_secs(10)));
                client
                    .write_all(b"GET /hello.txt HTTP/1.1\r\n\r\n")
                    .unwrap();

                let mut response = Vec::new();
                let _ = client.read_to_end(&mut response).unwrap();
                response
            })
        })
        .collect();

    for handle in handles {
        let response = handle.join().unwrap();
        assert!(response.starts_with(b"HTTP/1.1 200 OK\r\n"));
        assert!(response.ends_with(b"hello world\n"));
    }
}

#[test]
fn test_saturated_pool_rejects_and_recovers() {
    // pool {min 2, max 4, queue 10}: two core workers and two overflow
    // workers block on held connections, ten more wait in the backlog.
    // Submission 15 must be dropped without a response; every held
    // connection must still be answered once released.
    let (server, _root) = support::new_file_server();

    let mut held = Vec::new();
    for _ in 0..14 {
        held.push(open_held_connection(&server));
        thread::sleep(Duration::from_millis(50));
    }
    thread::sleep(Duration::from_millis(300));

    // all workers busy, backlog full: this connection is rejected
    let mut rejected = support::create_client(server.server_addr(), Some(Duration::from_secs(10)));
    rejected
        .write_all(b"GET /hello.txt HTTP/1.1\r\n\r\n")
        .unwrap();

    let mut response = Vec::new();
    let _ = rejected.read_to_end(&mut response);
    assert!(response.is_empty(), "rejected connection got a response");

    // releasing the held connections lets the workers drain the backlog
    for client in &mut held {
        let text = release(client);
        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.ends_with("hello world\n"));
    }

    // all sockets answered and closed; the gauge falls back to zero
    let deadline = Instant::now() + Duration::from_secs(5);
    while server.num_connections() > 0 {
        assert!(Instant::now() < deadline, "connections not released");
        thread::sleep(Duration::from_millis(10));
    }

    // the pool keeps serving after the rejection
    let response = support::fetch(&server, "/hello.txt");
    assert!(response.starts_with(b"HTTP/1.1 200 OK\r\n"));
}
