mod common;

use common::{read_sheet, sheet_names, test_config, write_pcat, write_simple};
use pcat_efeito::{Consolidator, FileOutcome, SaveOutcome, SourceEntry, YearAssignment};
use tempfile::TempDir;

#[test]
fn test_two_files_same_year_stack_in_order() {
    let temp_dir = TempDir::new().unwrap();
    let first = temp_dir.path().join("PCAT_Cemar_2020.xlsx");
    let second = temp_dir.path().join("PCAT Cemar 2020 V02.xlsx");
    write_simple(&first, "DEC", 10.0);
    write_simple(&second, "FEC", 20.0);

    let files = vec![
        SourceEntry::new(&first, "PCAT Maranhão 2020 a"),
        SourceEntry::new(&second, "PCAT Maranhão 2020 b"),
    ];
    let mut consolidator = Consolidator::new(test_config(temp_dir.path(), files)).unwrap();
    let summary = consolidator.run().unwrap();

    let output = consolidator.output_manager().get_output_file().to_path_buf();
    assert_eq!(summary.save, SaveOutcome::Written { path: output.clone(), sheets: vec![2020] });

    let rows = read_sheet(&output, "2020");
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0], vec!["Arquivo_Origem", "Caminho_Arquivo", "Indicador", "Valor"]);
    assert_eq!(rows[1][0], "PCAT Maranhão 2020 a");
    assert_eq!(rows[1][1], first.to_string_lossy());
    assert_eq!(rows[1][2], "DEC");
    assert_eq!(rows[2][0], "PCAT Maranhão 2020 b");
    assert_eq!(rows[2][2], "FEC");
    assert!(rows.iter().all(|row| row.len() == 4));
}

#[test]
fn test_empty_years_get_no_sheet() {
    let temp_dir = TempDir::new().unwrap();
    let source = temp_dir.path().join("PCAT_2021.xlsx");
    write_simple(&source, "DEC", 1.0);

    let files = vec![SourceEntry::new(&source, "PCAT 2021")];
    let mut consolidator = Consolidator::new(test_config(temp_dir.path(), files)).unwrap();
    consolidator.run().unwrap();

    let output = consolidator.output_manager().get_output_file();
    assert_eq!(sheet_names(output), vec!["2021".to_string()]);
}

#[test]
fn test_single_year_match_lands_in_that_bucket_only() {
    let temp_dir = TempDir::new().unwrap();
    let source = temp_dir.path().join("PCAT Equatorial MA 2019 V02.xlsx");
    write_simple(&source, "DEC", 1.0);

    let files = vec![SourceEntry::new(&source, "PCAT 2019")];
    let mut consolidator = Consolidator::new(test_config(temp_dir.path(), files)).unwrap();
    let reports = consolidator.process_files();

    assert_eq!(
        reports[0].outcome,
        FileOutcome::Assigned { assignment: YearAssignment::Inferred(2019), rows: 1 }
    );
    assert_eq!(consolidator.buckets().tables(2019).len(), 1);
    assert!(consolidator.buckets().tables(2020).is_empty());
    assert!(consolidator.buckets().tables(2021).is_empty());
}

#[test]
fn test_unmatched_path_is_extracted_but_not_written() {
    let temp_dir = TempDir::new().unwrap();
    let dated = temp_dir.path().join("PCAT_2020.xlsx");
    let undated = temp_dir.path().join("PCAT_Cemar.xlsx");
    write_simple(&dated, "DEC", 1.0);
    write_simple(&undated, "LOST", 2.0);

    let files = vec![
        SourceEntry::new(&dated, "PCAT 2020"),
        SourceEntry::new(&undated, "PCAT sem ano"),
    ];
    let mut consolidator = Consolidator::new(test_config(temp_dir.path(), files)).unwrap();
    let summary = consolidator.run().unwrap();

    assert_eq!(summary.unassigned, 1);
    assert!(summary.is_clean());
    assert_eq!(consolidator.buckets().unassigned().len(), 1);

    let output = consolidator.output_manager().get_output_file();
    for sheet in sheet_names(output) {
        let rows = read_sheet(output, &sheet);
        assert!(rows.iter().all(|row| !row.contains(&"LOST".to_string())));
    }
}

#[test]
fn test_nonexistent_path_does_not_abort() {
    let temp_dir = TempDir::new().unwrap();
    let present = temp_dir.path().join("PCAT_2020.xlsx");
    write_simple(&present, "DEC", 1.0);

    let files = vec![
        SourceEntry::new(temp_dir.path().join("PCAT_2019.xlsx"), "PCAT 2019"),
        SourceEntry::new(&present, "PCAT 2020"),
    ];
    let mut consolidator = Consolidator::new(test_config(temp_dir.path(), files)).unwrap();
    let summary = consolidator.run().unwrap();

    assert_eq!(summary.missing, 1);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.save.sheets(), &[2020]);
}

#[test]
fn test_tagged_year_overrides_filename() {
    let temp_dir = TempDir::new().unwrap();
    let source = temp_dir.path().join("PCAT_2020_revisado_2021.xlsx");
    write_simple(&source, "DEC", 1.0);

    let files = vec![SourceEntry::new(&source, "PCAT 2021").with_year(2021)];
    let mut consolidator = Consolidator::new(test_config(temp_dir.path(), files)).unwrap();
    let summary = consolidator.run().unwrap();

    assert_eq!(summary.save.sheets(), &[2021]);
}

#[test]
fn test_ragged_columns_are_aligned_by_label() {
    let temp_dir = TempDir::new().unwrap();
    let first = temp_dir.path().join("PCAT_A_2020.xlsx");
    let second = temp_dir.path().join("PCAT_B_2020.xlsx");
    write_pcat(&first, "EFEITO", ["Indicador", "Valor"], &[("DEC", 1.0)]);
    write_pcat(&second, "EFEITO", ["Indicador", "Meta"], &[("FEC", 2.0)]);

    let files = vec![SourceEntry::new(&first, "a"), SourceEntry::new(&second, "b")];
    let mut consolidator = Consolidator::new(test_config(temp_dir.path(), files)).unwrap();
    consolidator.run().unwrap();

    let rows = read_sheet(consolidator.output_manager().get_output_file(), "2020");
    assert_eq!(
        rows[0],
        vec!["Arquivo_Origem", "Caminho_Arquivo", "Indicador", "Valor", "Meta"]
    );
    assert_eq!(rows[1][4], "");
    assert_eq!(rows[2][3], "");
    assert_eq!(rows[2][4], "2");
}

#[test]
fn test_missing_sheet_is_logged_and_skipped() {
    let temp_dir = TempDir::new().unwrap();
    let wrong = temp_dir.path().join("PCAT_2019.xlsx");
    let right = temp_dir.path().join("PCAT_2020.xlsx");
    write_pcat(&wrong, "OUTRA", ["Indicador", "Valor"], &[("DEC", 1.0)]);
    write_simple(&right, "DEC", 1.0);

    let files = vec![SourceEntry::new(&wrong, "wrong"), SourceEntry::new(&right, "right")];
    let mut consolidator = Consolidator::new(test_config(temp_dir.path(), files)).unwrap();
    let summary = consolidator.run().unwrap();

    assert_eq!(summary.failed, 1);
    assert_eq!(summary.save.sheets(), &[2020]);
}

#[test]
fn test_repeated_runs_are_content_equivalent() {
    let temp_dir = TempDir::new().unwrap();
    let a = temp_dir.path().join("PCAT_2019.xlsx");
    let b = temp_dir.path().join("PCAT_2021.xlsx");
    write_simple(&a, "DEC", 1.5);
    write_simple(&b, "FEC", 2.5);

    let files = vec![SourceEntry::new(&a, "a"), SourceEntry::new(&b, "b")];
    let config = test_config(temp_dir.path(), files);

    let mut first = Consolidator::new(config.clone()).unwrap();
    first.run().unwrap();
    let output = first.output_manager().get_output_file().to_path_buf();
    let before: Vec<_> = sheet_names(&output)
        .into_iter()
        .map(|sheet| (sheet.clone(), read_sheet(&output, &sheet)))
        .collect();

    let mut second = Consolidator::new(config).unwrap();
    assert!(!second.output_manager().initialize().unwrap());
    second.run().unwrap();
    let after: Vec<_> = sheet_names(&output)
        .into_iter()
        .map(|sheet| (sheet.clone(), read_sheet(&output, &sheet)))
        .collect();

    assert_eq!(before, after);
    assert_eq!(before.len(), 2);
}

#[test]
fn test_zero_existing_files_writes_no_workbook() {
    let temp_dir = TempDir::new().unwrap();
    let files = vec![
        SourceEntry::new(temp_dir.path().join("PCAT_2019.xlsx"), "a"),
        SourceEntry::new(temp_dir.path().join("PCAT_2020.xlsx"), "b"),
    ];
    let mut consolidator = Consolidator::new(test_config(temp_dir.path(), files)).unwrap();
    let summary = consolidator.run().unwrap();

    assert_eq!(summary.missing, 2);
    assert_eq!(summary.save, SaveOutcome::NothingToWrite);
    assert!(consolidator.output_manager().get_output_directory().is_dir());
    assert!(!consolidator.output_manager().get_output_file().exists());
}
