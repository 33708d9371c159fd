//! Human-readable and JSON rendering of tunnels

use std::fmt::Write;

use argo_api::Tunnel;
use serde::Serialize;

/// Render any value as pretty JSON
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Render tunnels as an aligned table
pub fn tunnel_table(tunnels: &[Tunnel]) -> String {
    if tunnels.is_empty() {
        return "No tunnels found".to_string();
    }

    let rows: Vec<[String; 5]> = tunnels
        .iter()
        .map(|t| {
            [
                t.id.clone(),
                t.name.clone(),
                t.created_at
                    .map(|c| c.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_else(|| "-".to_string()),
                connection_summary(t),
                if t.is_deleted() { "deleted" } else { "active" }.to_string(),
            ]
        })
        .collect();

    let header = ["ID", "NAME", "CREATED", "CONNECTIONS", "STATUS"];
    let mut widths = header.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let mut out = String::new();
    let mut push_row = |cells: &[&str]| {
        let line = cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect::<Vec<_>>()
            .join("  ");
        let _ = writeln!(out, "{}", line.trim_end());
    };

    push_row(&header);
    for row in &rows {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        push_row(&cells);
    }

    out.trim_end().to_string()
}

/// Render a single tunnel with its connections
pub fn tunnel_detail(tunnel: &Tunnel) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "ID:          {}", tunnel.id);
    let _ = writeln!(out, "Name:        {}", tunnel.name);
    if let Some(created) = tunnel.created_at {
        let _ = writeln!(out, "Created:     {}", created.to_rfc3339());
    }
    if let Some(deleted) = tunnel.deleted_at {
        let _ = writeln!(out, "Deleted:     {}", deleted.to_rfc3339());
    }
    let _ = writeln!(out, "Connections: {}", tunnel.connections.len());
    for conn in &tunnel.connections {
        let pending = if conn.is_pending_reconnect {
            " (pending reconnect)"
        } else {
            ""
        };
        let _ = writeln!(out, "  {} {}{}", conn.colo_name, conn.uuid, pending);
    }
    out.trim_end().to_string()
}

/// e.g. `2 (DFW, LHR)`
fn connection_summary(tunnel: &Tunnel) -> String {
    if tunnel.connections.is_empty() {
        return "0".to_string();
    }

    let colos: Vec<&str> = tunnel
        .connections
        .iter()
        .map(|c| c.colo_name.as_str())
        .collect();
    format!("{} ({})", colos.len(), colos.join(", "))
}
