use super::*;

#[test]
fn test_empty_file_uses_defaults() {
	let config = Config::parse("").unwrap();
	let request = config.request();

	assert_eq!(request, CatalogRequest::default());
	assert!(!config.jsa_catalog);
}

#[test]
fn test_full_config() {
	let config = Config::parse(
		r#"
		backoff = false
		deconv = false
		fwhm_beam = 3.5
		velocity_resolution = 1.5
		shape = "ellipse"
		jsa_catalog = false
		wcs = [
			[2.0, 0.0, 0.0, 100.0],
			[0.0, 2.0, 0.0, -50.0],
			[0.0, 0.0, 1.0, 0.0],
		]
		"#,
	)
	.unwrap();
	let request = config.request();

	assert!(!request.subtract_background);
	assert!(!request.deconvolve);
	assert_eq!(request.beam.fwhm_beam, 3.5);
	assert_eq!(request.beam.velocity_resolution, 1.5);
	assert_eq!(request.shape, ShapeMode::Ellipse);
	assert_eq!(request.coordinates.apply([1.0, 1.0, 1.0]), [102.0, -48.0, 1.0]);
}

#[test]
fn test_rejects_non_positive_beam() {
	let err = Config::parse("fwhm_beam = 0.0").unwrap_err();
	assert!(err.to_string().contains("fwhm_beam"));

	assert!(Config::parse("velocity_resolution = -1.0").is_err());
}

#[test]
fn test_rejects_singular_wcs() {
	let err = Config::parse("wcs = [[0.0, 0.0, 0.0, 1.0], [0.0, 1.0, 0.0, 0.0], [0.0, 0.0, 1.0, 0.0]]")
		.unwrap_err();
	assert!(err.to_string().contains("singular"));
}

#[test]
fn test_rejects_unknown_keys() {
	assert!(Config::parse("fwhmbeam = 2.0").is_err());
	assert!(Config::parse("shape = \"circle\"").is_err());
}
