use clap::Parser;
use company_pipeline::{cli, client, config, error, report, session};
use cli::{Cli, Commands, DatasetsCommand, LettersArgs};
use client::{ApiClient, Download};
use company_pipeline_common::letters::{summary_message, DataSource, LetterForm};
use company_pipeline_common::polling::{
    evaluate, poll_until_terminal, JobOutcome, PollStep, Progress,
};
use company_pipeline_common::regions::{
    counties_for_regions, find_region, format_county_list, parse_county_list,
};
use company_pipeline_common::search::{csv_filename, results_to_csv, validate_query};
use company_pipeline_common::types::{CompanyField, EnrichRequest, SaveDatasetRequest};
use company_pipeline_common::views::extract_request;
use company_pipeline_common::{CellEdit, DeltaReport, Error as CommonError};
use config::Config;
use dialoguer::Confirm;
use error::{PipelineError, Result};
use indicatif::{ProgressBar, ProgressStyle};
use session::Session;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    run(cli).await
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("company_pipeline=debug,company_pipeline_common=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load()?;

    // 設定変更はAPIに繋がなくても実行できる
    if let Commands::Config { set_api_url, show } = &cli.command {
        if let Some(url) = set_api_url {
            config.set_api_base_url(url)?;
            config.save()?;
            println!("✔ APIのURLを設定しました: {}", config.api_base_url);
        }
        if *show || set_api_url.is_none() {
            println!("設定:");
            println!("  API URL: {}", config.api_base_url());
            println!("  ポーリング間隔: {}ms", config.poll_interval_ms);
            println!("  企業一覧の上限: {}件", config.companies_limit);
            println!("  タイムアウト: {}秒", config.timeout_seconds);
            println!("  設定ファイル: {}", Config::config_path()?.display());
        }
        return Ok(());
    }

    let client = ApiClient::new(&config)?;
    tracing::debug!(base_url = client.base_url(), "api client ready");

    match cli.command {
        Commands::Datasets { action } => run_datasets(&client, &config, action).await?,

        Commands::Extract { sic, counties, region, force_refresh } => {
            println!("🏢 company-pipeline - 企業抽出\n");

            let counties_input = merge_counties(counties.as_deref(), &region)?;
            let request = extract_request(&sic, &counties_input, force_refresh)?;
            match &request.counties {
                Some(c) => println!("- SIC {} / {}州", request.sic_codes.join(", "), c.len()),
                None => println!("- SIC {} / 全州", request.sic_codes.join(", ")),
            }

            let response = client.extract(&request).await?;
            println!("✔ 抽出完了: {}", response.current_dataset);
            if !response.stages_completed.is_empty() {
                println!("  完了ステージ: {}", response.stages_completed.join(", "));
            }

            let mut session = Session::load()?;
            session.start_extract(&response.job_id, &response.current_dataset, &request);
            session.save()?;
            println!("\n次の操作: companies analyze / companies enrich / companies save --name <名前>");
        }

        Commands::Analyze => {
            let session = Session::load()?;
            let dataset_file = session.require_dataset_file()?;
            println!("📊 解析中: {}\n", dataset_file);
            let analysis = client.analyze_file(dataset_file).await?;
            print!("{}", report::analysis(&analysis));
        }

        Commands::Enrich { format, no_wait } => {
            let mut session = Session::load()?;
            let dataset_file = session.require_dataset_file()?.to_string();
            println!("✨ エンリッチ開始: {}", dataset_file);

            let started = client
                .enrich(&EnrichRequest { dataset_file, output_format: format })
                .await?;
            session.start_enrich(&started.job_id);
            session.save()?;
            println!("✔ ジョブID: {}", started.job_id);

            if no_wait {
                println!("\n進捗は companies status で確認できます");
            } else {
                finish_job(&client, &config, &mut session).await?;
            }
        }

        Commands::Status { wait } => {
            let mut session = Session::load()?;
            let job_id = session.require_job()?.to_string();
            if wait {
                finish_job(&client, &config, &mut session).await?;
            } else {
                let status = client.job_status(&job_id).await?;
                println!("{}", report::job_status(&status));
                if session.enriching {
                    match evaluate(&status) {
                        PollStep::Completed(result) => {
                            let outcome = JobOutcome::Completed { result };
                            session.finish_enrich(outcome.output_file());
                            session.save()?;
                        }
                        PollStep::Failed(_) => {
                            session.fail_enrich();
                            session.save()?;
                        }
                        PollStep::Continue(_) => {}
                    }
                }
            }
        }

        Commands::Download { output } => {
            let session = Session::load()?;
            let job_id = session.require_job()?;
            if session.enriching {
                return Err(PipelineError::Config(
                    "エンリッチが完了していません。companies status --wait で完了を待ってください".into(),
                ));
            }
            let download = client.download_job(job_id, "csv").await?;
            let path = save_download(&download, output.as_deref())?;
            println!("✔ ダウンロード: {}", path.display());
        }

        Commands::Save { name, description } => {
            let session = Session::load()?;
            let request = SaveDatasetRequest {
                dataset_name: name.trim().to_string(),
                parquet_file: session.require_dataset_file()?.to_string(),
                sic_codes: session.sic_codes.clone(),
                counties: session.counties.clone(),
                description: description.map(|d| d.trim().to_string()).filter(|d| !d.is_empty()),
            };
            if request.dataset_name.is_empty() {
                return Err(CommonError::validation("Enter a dataset name").into());
            }

            let saved = client.save_dataset(&request).await?;
            println!(
                "✔ データセットを保存しました: {} (ID: {}, {}社)",
                saved.dataset_name, saved.dataset_id, saved.total_companies
            );
        }

        Commands::Search { query, csv } => {
            let query = validate_query(&query)?;
            let response = client.search(&query).await?;
            print!("{}", report::search(&response));

            if let Some(target) = csv {
                let path = if target.is_dir() { target.join(csv_filename(&query)) } else { target };
                std::fs::write(&path, results_to_csv(&response))?;
                println!("\n✔ CSVを保存: {}", path.display());
            }
        }

        Commands::Edit { dataset, company, field, value } => {
            let field = CompanyField::from_key(&field).ok_or_else(|| {
                let keys: Vec<&str> = CompanyField::ALL
                    .iter()
                    .filter(|f| f.editable())
                    .map(|f| f.key())
                    .collect();
                CommonError::validation(format!(
                    "Unknown field: {} (editable: {})",
                    field,
                    keys.join(", ")
                ))
            })?;

            let companies = client.dataset_companies(dataset, config.companies_limit).await?;
            let record = companies
                .companies
                .iter()
                .find(|c| c.id == company)
                .ok_or_else(|| {
                    CommonError::validation(format!(
                        "Company {} not found in dataset {}",
                        company, dataset
                    ))
                })?;

            match CellEdit::new(record, field, &value)? {
                None => println!("変更はありません"),
                Some(edit) => {
                    client.patch_company(edit.company_id, &edit.patch_body()).await?;
                    println!(
                        "✔ {}: {} → {}",
                        field.label(),
                        edit.previous.as_deref().unwrap_or("(空)"),
                        edit.value.as_deref().unwrap_or("(空)")
                    );
                }
            }
        }

        Commands::Letters(args) => run_letters(&client, args).await?,

        Commands::Compare { dataset, current, file } => {
            println!("🔍 company-pipeline - 比較\n");

            let initial = match (dataset, current) {
                (Some(id), _) => {
                    println!("[1/2] データセット {} を解析中...", id);
                    client.analyze_dataset(id).await?
                }
                (None, true) => {
                    let session = Session::load()?;
                    let dataset_file = session.require_dataset_file()?;
                    println!("[1/2] {} を解析中...", dataset_file);
                    client.analyze_file(dataset_file).await?
                }
                (None, false) => {
                    return Err(CommonError::validation(
                        "Select an initial dataset (--dataset <id> or --current)",
                    )
                    .into());
                }
            };

            if !file.exists() {
                return Err(PipelineError::FileNotFound(file.display().to_string()));
            }
            println!("[2/2] {} を解析中...\n", file.display());
            let final_result = client.analyze_final(&file).await?;

            print!("{}", DeltaReport::between(&initial, &final_result).to_text());
        }

        Commands::Config { .. } => {}
    }

    Ok(())
}

async fn run_datasets(client: &ApiClient, config: &Config, action: DatasetsCommand) -> Result<()> {
    match action {
        DatasetsCommand::List => {
            let datasets = client.list_datasets().await?;
            print!("{}", report::dataset_list(&datasets));
        }

        DatasetsCommand::Show { id, limit } => {
            let dataset = client.get_dataset(id).await?;
            let companies = client
                .dataset_companies(id, limit.unwrap_or(config.companies_limit))
                .await?;
            print!("{}", report::dataset_detail(&dataset, &companies));
        }

        DatasetsCommand::Analyze { id } => {
            println!("📊 データセット {} を解析中...\n", id);
            let analysis = client.analyze_dataset(id).await?;
            print!("{}", report::analysis(&analysis));
        }

        DatasetsCommand::Export { id, format, output } => {
            let download = client.export_dataset(id, format).await?;
            let path = save_download(&download, output.as_deref())?;
            println!("✔ エクスポート: {}", path.display());
        }

        DatasetsCommand::Delete { id, yes } => {
            let dataset = client.get_dataset(id).await?;
            let confirmed = yes
                || Confirm::new()
                    .with_prompt(format!(
                        "データセット「{}」({}社) を削除しますか？",
                        dataset.name, dataset.total_companies
                    ))
                    .default(false)
                    .interact()?;
            if !confirmed {
                println!("中止しました");
                return Ok(());
            }

            client.delete_dataset(id).await?;
            println!("✔ 削除しました: {}", dataset.name);
        }
    }
    Ok(())
}

async fn run_letters(client: &ApiClient, args: LettersArgs) -> Result<()> {
    let file_name = |p: &Path| p.file_name().map(|n| n.to_string_lossy().into_owned());
    let form = LetterForm {
        source: if args.dataset.is_some() { DataSource::Dataset } else { DataSource::Upload },
        mode: args.mode,
        letters_per_file: args.letters_per_file,
        data_file_name: args.data.as_deref().and_then(file_name),
        template_file_name: file_name(&args.template),
        dataset_id: args.dataset,
    };
    let params = form.validate()?;

    for path in std::iter::once(&args.template).chain(args.data.iter()) {
        if !path.exists() {
            return Err(PipelineError::FileNotFound(path.display().to_string()));
        }
    }

    println!("✉️  レター生成中 ({})...", params.mode.as_str());
    let download = match (params.dataset_id, args.data.as_deref()) {
        (Some(id), _) => client.letters_from_dataset(id, &args.template, &params).await?,
        (None, Some(data)) => client.letters_from_upload(data, &args.template, &params).await?,
        (None, None) => {
            return Err(CommonError::validation("Select a dataset").into());
        }
    };

    let path = save_download(&download, args.output.as_deref())?;
    println!(
        "✔ {}",
        summary_message(
            &path.display().to_string(),
            download.total_letters.as_deref(),
            download.files_created.as_deref()
        )
    );
    Ok(())
}

/// エンリッチジョブの完了を待ち、結果をセッションに反映
async fn finish_job(client: &ApiClient, config: &Config, session: &mut Session) -> Result<()> {
    let job_id = session.require_job()?.to_string();

    let bar = ProgressBar::new(100);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:30.cyan/blue}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░"),
    );
    bar.set_message("待機中...");

    let on_progress = |p: Progress| {
        bar.set_position(p.percent as u64);
        bar.set_message(p.label());
    };
    let outcome = poll_until_terminal(
        client,
        &job_id,
        config.poll_interval(),
        tokio::time::sleep,
        on_progress,
    )
    .await;
    bar.finish_and_clear();

    match outcome? {
        outcome @ JobOutcome::Completed { .. } => {
            session.finish_enrich(outcome.output_file());
            session.save()?;
            println!("✔ エンリッチ完了");
            if let Some(file) = outcome.output_file() {
                println!("  出力ファイル: {}", file);
            }
            println!("\n次の操作: companies download / companies save --name <名前>");
            Ok(())
        }
        JobOutcome::Failed { error } => {
            session.fail_enrich();
            session.save()?;
            Err(PipelineError::JobFailed(error))
        }
    }
}

/// `--counties` と `--region` を1つの州リストにまとめる
fn merge_counties(counties: Option<&str>, regions: &[String]) -> Result<String> {
    let mut names = Vec::new();
    for region in regions {
        let found = find_region(region).ok_or_else(|| {
            CommonError::validation(format!("Unknown region: {}", region))
        })?;
        names.push(found.name);
    }

    let mut merged = parse_county_list(counties.unwrap_or(""));
    for county in counties_for_regions(names.as_slice()) {
        if !merged.contains(&county) {
            merged.push(county);
        }
    }
    Ok(format_county_list(&merged))
}

fn save_download(download: &Download, output: Option<&Path>) -> Result<PathBuf> {
    let dir = output.map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."));
    Ok(download.save_in(&dir)?)
}
