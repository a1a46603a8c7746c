use cpal::Device;
use cpal::traits::{DeviceTrait, HostTrait};

fn get_host() -> cpal::Host {
    cpal::default_host()
}

/// Input device by name, or the host default when no name is given.
pub fn get_or_default_input(device_name: Option<String>) -> anyhow::Result<Device> {
    let host = get_host();
    tracing::debug!("Host: {:?}", host.id());
    match device_name {
        None => host
            .default_input_device()
            .ok_or_else(|| anyhow::anyhow!("no default input device")),
        Some(target) => host
            .input_devices()?
            .find(|d| d.name().is_ok_and(|name| name == target))
            .ok_or_else(|| anyhow::anyhow!("input device not found: {target}")),
    }
}

pub fn get_or_default_output(device_name: Option<String>) -> anyhow::Result<Device> {
    let host = get_host();
    match device_name {
        None => host
            .default_output_device()
            .ok_or_else(|| anyhow::anyhow!("no default output device")),
        Some(target) => host
            .output_devices()?
            .find(|d| d.name().is_ok_and(|name| name == target))
            .ok_or_else(|| anyhow::anyhow!("output device not found: {target}")),
    }
}

fn describe(name: String, channels: u16, sample_rate: u32, default: Option<&str>) -> String {
    let mut d = format!(" * {}({}ch, {}hz)", name, channels, sample_rate);
    if default == Some(name.as_str()) {
        d.push_str(" [default]");
    }
    d
}

/// One line per input device; devices without a usable config are skipped.
pub fn get_available_inputs() -> anyhow::Result<String> {
    let host = get_host();
    let default_device = host.default_input_device().and_then(|d| d.name().ok());
    let mut device_names = Vec::new();
    for device in host.input_devices()? {
        let (Ok(name), Ok(cfg)) = (device.name(), device.default_input_config()) else {
            continue;
        };
        device_names.push(describe(
            name,
            cfg.channels(),
            cfg.sample_rate().0,
            default_device.as_deref(),
        ));
    }
    Ok(device_names.join("\n"))
}

pub fn get_available_outputs() -> anyhow::Result<String> {
    let host = get_host();
    let default_device = host.default_output_device().and_then(|d| d.name().ok());
    let mut device_names = Vec::new();
    for device in host.output_devices()? {
        let (Ok(name), Ok(cfg)) = (device.name(), device.default_output_config()) else {
            continue;
        };
        device_names.push(describe(
            name,
            cfg.channels(),
            cfg.sample_rate().0,
            default_device.as_deref(),
        ));
    }
    Ok(device_names.join("\n"))
}
