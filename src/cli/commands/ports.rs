use crate::cli::args::Cli;
use anyhow::{Context, Result};
use serialport::{SerialPortInfo, SerialPortType};

pub fn execute_ports_command(cli: &Cli) -> Result<()> {
    let ports = serialport::available_ports().context("Failed to enumerate serial ports")?;

    if cli.json {
        let names: Vec<serde_json::Value> = ports
            .iter()
            .map(|port| {
                serde_json::json!({ "port": port.port_name, "description": describe(port) })
            })
            .collect();
        println!("{}", serde_json::Value::Array(names));
        return Ok(());
    }

    if ports.is_empty() {
        println!("⚠️  No serial ports found");
    }
    for port in &ports {
        println!("🔌 {} {}", port.port_name, describe(port));
    }
    Ok(())
}

/// List available ports after a "serial port not defined" error
pub(crate) fn print_port_hint() {
    match serialport::available_ports() {
        Ok(ports) if !ports.is_empty() => {
            eprintln!("💡 Pass --port with one of:");
            for port in &ports {
                eprintln!("   {} {}", port.port_name, describe(port));
            }
        }
        Ok(_) => eprintln!("💡 No serial ports detected; pass --port <port> or an IPv4 address"),
        Err(e) => log::debug!("Could not list serial ports: {}", e),
    }
}

fn describe(port: &SerialPortInfo) -> String {
    match &port.port_type {
        SerialPortType::UsbPort(usb) => format!(
            "(USB {:04x}:{:04x}{})",
            usb.vid,
            usb.pid,
            usb.product
                .as_deref()
                .map(|p| format!(" {}", p))
                .unwrap_or_default()
        ),
        SerialPortType::BluetoothPort => "(Bluetooth)".to_string(),
        SerialPortType::PciPort => "(PCI)".to_string(),
        SerialPortType::Unknown => String::new(),
    }
}
