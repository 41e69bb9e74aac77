//! Diamond propagation demo: one cell feeding a derivation both directly
//! and through an intermediate, with a listener on the apex.
//!
//! Run with `cargo run --example diamond`.

use fluid_core::{derive, listen_with, val, write, ListenProps};

fn main() {
    let word = val(String::from("x"));
    let upper = derive(&word, |s: String| s.to_uppercase());
    let paired = derive((&word, &upper), |(a, b): (String, String)| {
        format!("{a}{b}")
    });

    let sub = listen_with(
        &paired,
        |value: String| println!("paired = {value}"),
        ListenProps {
            immediate: true,
            ..ListenProps::default()
        },
    );

    write(&word, String::from("a"));
    write(&word, String::from("b"));

    sub.dispose();
    write(&word, String::from("silent"));
}
