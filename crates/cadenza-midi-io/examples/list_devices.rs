use cadenza_midi_io::{input_names, ioport_names, output_names, MidirBackend};

fn print_names(title: &str, names: cadenza_midi_io::Result<Vec<String>>) {
    println!("=== {} ===", title);
    match names {
        Ok(names) if names.is_empty() => println!("  (none found)"),
        Ok(names) => {
            for (i, name) in names.iter().enumerate() {
                println!("  [{}] {}", i, name);
            }
        }
        Err(e) => println!("  error: {}", e),
    }
}

fn main() {
    let backend = MidirBackend::with_client_name("list-devices");

    print_names("MIDI Input Devices", input_names(&backend));
    println!();
    print_names("MIDI Output Devices", output_names(&backend));
    println!();
    print_names("MIDI I/O Devices", ioport_names(&backend));
}
