//! Facade-level test wiring saved profiles into a live transport

use netserial::{
    Config, DeviceProfile, PortSettings, SerialSettings, SerialTransport, TcpSerialSettings,
    TcpSerialTransport,
};
use tempfile::TempDir;

#[tokio::test]
async fn saved_profile_configures_a_transport() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");

    let mut profile = DeviceProfile::new("workshop", "bridge.local:8000");
    profile.serial = SerialSettings::with_baud_rate(250000);
    profile.uart_packet_time = 10;
    profile.uart_packet_length = 64;

    let mut config = Config::new();
    config.upsert_profile(profile);
    config.active_profile = Some("workshop".to_string());
    config.save_to_file(&path).unwrap();

    let loaded = Config::load_from_file(&path).unwrap();
    let profile = loaded.active().unwrap();

    let settings = TcpSerialSettings::from_serial(&profile.serial, &profile.address)
        .unwrap()
        .with_packet_framing(profile.uart_packet_time, profile.uart_packet_length);
    assert_eq!(settings.port_name(), "tcp://bridge.local:8000");
    assert_eq!(settings.serial.baud_rate, 250000);

    let transport = TcpSerialTransport::new();
    transport
        .apply_settings(&PortSettings::Tcp(settings))
        .await
        .unwrap();
    assert_eq!(
        transport.port_names(),
        vec!["bridge.local:8000".to_string()]
    );
}

#[test]
fn version_is_stamped() {
    assert!(!netserial::VERSION.is_empty());
    assert!(!netserial::BUILD_DATE.is_empty());
}
