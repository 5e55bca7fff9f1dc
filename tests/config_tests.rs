use rekognizer::config::Environment;
use rekognizer::utils::validation::Validate;
use rekognizer::ServiceConfig;

const SAMPLE: &str = include_str!("../config/rekognizer.toml");

#[test]
fn test_sample_config_parses() {
    let config = ServiceConfig::from_toml_str(SAMPLE).unwrap();

    assert_eq!(config.server.bind_address, "0.0.0.0:8000");
    assert_eq!(config.facenet.port, 8501);
    assert_eq!(config.facenet.image_size, 160);
    assert_eq!(config.facenet.threshold, 0.8);
    assert_eq!(config.detector.margin, 32);
    assert_eq!(config.images.max_image_width, Some(1024));
}

#[test]
fn test_sample_config_validates_with_resolved_placeholders() {
    let resolved = SAMPLE
        .replace("${ENV}", "production")
        .replace("${DATABASE_URL}", "postgres://rekognizer@db:5432/rekognizer")
        .replace("${FACENET_HOST}", "facenet")
        .replace("${DETECTOR_URL}", "http://mtcnn:8000/detect");

    let config = ServiceConfig::from_toml_str(&resolved).unwrap();
    assert_eq!(config.environment, Environment::Production);
    assert!(config.validate().is_ok());
}

#[test]
fn test_unknown_environment_falls_back_to_development() {
    let resolved = SAMPLE.replace("${ENV}", "staging");
    let config = ServiceConfig::from_toml_str(&resolved).unwrap();
    assert_eq!(config.environment, Environment::Development);
}
