//! Discharge summary prompt construction.

use crate::record::PatientRecord;

/// Section headings the generated summary must follow, in order.
pub const SECTIONS: [&str; 11] = [
    "CONSULTANTS INVOLVED",
    "DIAGNOSIS",
    "KEY FINDINGS AND CLINICAL COURSE",
    "INVESTIGATIONS AND TREATMENT",
    "CLINICAL NOTES",
    "SUMMARY",
    "CONDITION AT DISCHARGE",
    "PRESCRIPTION ON DISCHARGE",
    "ADVICE",
    "EMERGENCY INSTRUCTIONS",
    "FOLLOW-UP",
];

const INSTRUCTIONS: &str = "Given the following patient hospital data, generate a discharge summary. \
Follow the structure below strictly and make sure the output is clean, readable, and suitable for \
printing as plain text in a PDF (avoid special symbols, markdown or formatting that would break in plain text):";

/// Body of each section, paired with [`SECTIONS`] by position.
const SECTION_BODIES: [&str; 11] = [
    r#"Primary Consultant:
<primary_consultant_name>, <speciality>
Other Consultants:
<consultant_1_name> (<speciality>)
<consultant_2_name> (<speciality>)
... (if any)"#,
    r#"Provisional Diagnosis: <provisional_diagnosis>
Final Diagnosis: <final_diagnosis>"#,
    r#"<clinical_course_description>
Mention presenting symptoms, relevant test results, clinical progression, any support provided, and response to treatment."#,
    r#"* <Test 1>
* <Test 2>
* <Medication with dosage and route>
* <Other treatments: physiotherapy, oxygen, etc.>"#,
    r#"* <Any observations: vitals, mobility, diet, compliance, etc.>"#,
    r#"Provide a very detailed clinical summary of the admission, highlighting diagnosis, major treatments, progression, and condition at discharge in this section. For example: During his hospitalization, Mr. Mondal received antibiotic therapy for the treatment of pneumonia. Diagnostic studies included a Chest X-Ray and Blood Test, which showed improvement as evident from the Chest X-Ray report. Laboratory results revealed a normal Complete Blood Count (CBC).
The patient responded well to treatment, and no complications were observed throughout his stay. On the day of discharge, his vital signs were stable, with a blood pressure of 120/80 mmHg, pulse rate of 76 beats per minute, and a temperature of 98.6 F.
Medications prescribed at discharge include Azithromycin and Paracetamol.
In conclusion, Mr. Mondal has demonstrated significant improvement and is being discharged in a stable condition."#,
    r#"<Stable / Unstable / Deceased>"#,
    r#"1. <Medication> - <Dosage & Timing>
2. <Medication> - <Dosage & Timing>
3. ..."#,
    r#"* <Advice 1>
* <Advice 2>
* ..."#,
    r#"In case of <symptom1>, <symptom2>, or <symptom3>, report to the emergency department immediately."#,
    r#"<Department> on <Follow-up Date>"#,
];

/// Build the generation prompt for a patient record.
///
/// The record is embedded as pretty-printed JSON exactly as it was loaded;
/// gaps are left for the model to handle.
pub fn build(record: &PatientRecord) -> String {
    let data = serde_json::to_string_pretty(record.source())
        .unwrap_or_else(|_| "{}".to_string());

    let template = SECTIONS
        .iter()
        .zip(SECTION_BODIES)
        .map(|(heading, body)| format!("{heading}:\n{body}"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "{INSTRUCTIONS}\n{template}\nNow generate the summary based on this sample data Patient Data (in JSON format):\n{data}\n"
    )
}
