use crate::dicom::{DecodedImage, ImageMetadata};
use std::fmt::Display;

pub fn print_metadata(image: &DecodedImage) {
    let metadata = image.metadata();

    let patient = &metadata.patient;
    print_field("Patient Name", patient.name.as_ref());
    print_field("Patient ID", patient.id.as_ref());
    print_field("Birth Date", patient.birth_date.as_ref());
    print_field("Sex", patient.sex.as_ref());
    print_field("Age", patient.age.as_ref());

    let study = &metadata.study;
    print_field("Study Date", study.date.as_ref());
    print_field("Study Time", study.time.as_ref());
    print_field("Study Description", study.description.as_ref());
    print_field("Study UID", study.study_instance_uid.as_ref());
    print_field("Series Description", study.series_description.as_ref());
    print_field("Series UID", study.series_instance_uid.as_ref());
    print_field("Body Part", study.body_part.as_ref());
    print_field("Institution", study.institution_name.as_ref());
    print_field("Manufacturer", study.manufacturer.as_ref());
    print_field("Model", study.manufacturer_model_name.as_ref());
    println!("{:20}: {}", "Modality", metadata.modality);

    print_dimensions(metadata);
    println!("{:20}: {}", "Bit Depth", metadata.bit_depth);
    println!("{:20}: {}", "Pixel Representation", metadata.pixel_representation);
    println!("{:20}: {}", "Rescale", metadata.rescale);
    println!(
        "{:20}: W {} L {}",
        "Default Window", metadata.window_width, metadata.window_center
    );
    print_field("Pixel Spacing", metadata.pixel_spacing.as_ref());
    print_field("SOP Class UID", metadata.sop_class.as_ref());
    println!("{:20}: {}", "Transfer Syntax", metadata.transfer_syntax);

    println!();
}

fn print_field<T: Display>(name: &str, value: Option<&T>) {
    if let Some(v) = value {
        println!("{name:20}: {v}");
    }
}

fn print_dimensions(metadata: &ImageMetadata) {
    println!(
        "{:20}: {}x{} [{}]",
        "Dimensions", metadata.dimensions, metadata.samples_per_pixel, metadata.photometric_interpretation
    );
}
