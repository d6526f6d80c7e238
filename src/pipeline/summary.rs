use crate::types::record::{EnrichedTable, TableSummary};

pub fn summarize(table: &EnrichedTable) -> TableSummary {
    let records = &table.records;
    if records.is_empty() {
        return TableSummary::default();
    }

    let mut speed_sum = 0.0;
    let mut max_speed: f64 = 0.0;
    let mut incline_sum = 0.0;
    let mut distance_m = 0.0;
    let mut duration_seconds = 0.0;
    let mut rows_with_weather = 0;

    for (i, curr) in records.iter().enumerate() {
        speed_sum += curr.speed;
        max_speed = max_speed.max(curr.speed);
        incline_sum += curr.incline;

        if curr.temperature.is_some() || curr.wind_direction.is_some() || curr.wind_speed.is_some() {
            rows_with_weather += 1;
        }

        // elapsed_time restarts at zero at every segment (and file) boundary
        let segment_start = i == 0 || curr.elapsed_time == 0.0;
        let segment_end = records
            .get(i + 1)
            .map_or(true, |next| next.elapsed_time == 0.0);

        if !segment_start {
            let dt = curr.elapsed_time - records[i - 1].elapsed_time;
            if dt > 0.0 {
                distance_m += curr.speed / 3.6 * dt;
            }
        }
        if segment_end {
            duration_seconds += curr.elapsed_time;
        }
    }

    let rows = records.len();
    TableSummary {
        rows,
        avg_speed_kmh: speed_sum / rows as f64,
        max_speed_kmh: max_speed,
        avg_incline_pct: incline_sum / rows as f64,
        distance_m,
        duration_seconds,
        rows_with_weather,
    }
}
