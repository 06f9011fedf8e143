use std::time::Duration;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Compact duration text: `250ms`, `1.5s`, `2m3.25s`, `1h0m0s`.
pub fn format_uptime(d: Duration) -> String {
    let nanos = d.as_nanos();
    if nanos == 0 {
        return "0s".to_string();
    }
    if nanos < 1_000 {
        return format!("{nanos}ns");
    }
    if nanos < 1_000_000 {
        return format!("{}\u{b5}s", decimal(nanos, 1_000));
    }
    if nanos < NANOS_PER_SEC {
        return format!("{}ms", decimal(nanos, 1_000_000));
    }

    let total = d.as_secs();
    let (h, m) = (total / 3600, (total % 3600) / 60);
    let secs = decimal(u128::from(total % 60) * NANOS_PER_SEC + u128::from(d.subsec_nanos()), NANOS_PER_SEC);

    if h > 0 {
        format!("{h}h{m}m{secs}s")
    } else if m > 0 {
        format!("{m}m{secs}s")
    } else {
        format!("{secs}s")
    }
}

/// `value / unit` with trailing fractional zeros trimmed. `unit` is a power of ten.
fn decimal(value: u128, unit: u128) -> String {
    let (whole, rem) = (value / unit, value % unit);
    if rem == 0 {
        return whole.to_string();
    }
    let width = unit.ilog10() as usize;
    let frac = format!("{rem:0width$}");
    format!("{whole}.{}", frac.trim_end_matches('0'))
}
